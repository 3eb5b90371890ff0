use serde::Deserialize;

/// One page of a paginated listing
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    /// 0-based page index
    #[serde(default)]
    pub number: usize,
    #[serde(default)]
    pub size: usize,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn is_last(&self) -> bool {
        self.number + 1 >= self.total_pages
    }
}
