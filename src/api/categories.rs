use super::ApiClient;
use crate::error::Result;
use crate::models::{Category, CategoryInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKind {
    Expense,
    Revenue,
}

impl CategoryKind {
    fn path(self) -> &'static str {
        match self {
            CategoryKind::Expense => "/expense-categories",
            CategoryKind::Revenue => "/revenue-categories",
        }
    }
}

impl ApiClient {
    pub fn list_categories(&self, kind: CategoryKind) -> Result<Vec<Category>> {
        self.get(kind.path(), &[])
    }

    pub fn create_category(&self, kind: CategoryKind, input: &CategoryInput) -> Result<Category> {
        input.validate()?;
        self.post(kind.path(), input)
    }

    pub fn update_category(
        &self,
        kind: CategoryKind,
        id: i64,
        input: &CategoryInput,
    ) -> Result<Category> {
        input.validate()?;
        self.put(&format!("{}/{id}", kind.path()), input)
    }
}
