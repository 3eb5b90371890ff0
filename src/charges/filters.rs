use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// Draft inputs and the filters actually sent to the server.
///
/// The draft is edited freely; nothing reaches the query until `apply`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState<F> {
    draft: F,
    applied: F,
}

impl<F: Clone + Default + PartialEq> FilterState<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &F {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut F {
        &mut self.draft
    }

    pub fn applied(&self) -> &F {
        &self.applied
    }

    /// Whether the draft differs from what is applied
    pub fn is_dirty(&self) -> bool {
        self.draft != self.applied
    }

    /// Copy the draft into the applied filters. Returns true if they changed.
    pub fn apply(&mut self) -> bool {
        if self.draft == self.applied {
            return false;
        }
        self.applied = self.draft.clone();
        true
    }

    /// Reset both the draft and the applied filters
    pub fn clear(&mut self) {
        self.draft = F::default();
        self.applied = F::default();
    }
}

/// Filters accepted by `GET /account-charges`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChargeFilters {
    pub customer_name: Option<String>,
    pub cab_id: Option<i64>,
    pub driver_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub paid: Option<bool>,
}

impl ChargeFilters {
    fn push_params(&self, params: &mut Vec<(&'static str, String)>) {
        if let Some(name) = self.customer_name.as_deref().map(str::trim) {
            if !name.is_empty() {
                params.push(("customerName", name.to_string()));
            }
        }
        if let Some(id) = self.cab_id {
            params.push(("cabId", id.to_string()));
        }
        if let Some(id) = self.driver_id {
            params.push(("driverId", id.to_string()));
        }
        if let Some(date) = self.start_date {
            params.push(("startDate", date.to_string()));
        }
        if let Some(date) = self.end_date {
            params.push(("endDate", date.to_string()));
        }
        if let Some(paid) = self.paid {
            params.push(("paid", paid.to_string()));
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    #[default]
    Desc,
}

impl fmt::Display for SortDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        })
    }
}

impl FromStr for SortDir {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDir::Asc),
            "desc" => Ok(SortDir::Desc),
            other => Err(format!("invalid sort direction '{other}' (use asc or desc)")),
        }
    }
}

/// A complete request for one page of charges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeQuery {
    pub filters: ChargeFilters,
    pub page: usize,
    pub size: usize,
    pub sort_by: String,
    pub sort_dir: SortDir,
}

impl ChargeQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("size", self.size.to_string()),
            ("sortBy", self.sort_by.clone()),
            ("sortDir", self.sort_dir.to_string()),
        ];
        self.filters.push_params(&mut params);
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(filters: ChargeFilters) -> ChargeQuery {
        ChargeQuery {
            filters,
            page: 0,
            size: 25,
            sort_by: "tripDate".to_string(),
            sort_dir: SortDir::Desc,
        }
    }

    #[test]
    fn draft_is_not_applied_until_confirmed() {
        let mut state: FilterState<ChargeFilters> = FilterState::new();
        state.draft_mut().customer_name = Some("Acme".to_string());
        state.draft_mut().paid = Some(false);

        assert!(state.is_dirty());
        assert_eq!(state.applied(), &ChargeFilters::default());

        assert!(state.apply());
        assert_eq!(state.applied().customer_name.as_deref(), Some("Acme"));
        assert!(!state.is_dirty());
        assert!(!state.apply());
    }

    #[test]
    fn clearing_then_applying_matches_initial_query() {
        let mut state: FilterState<ChargeFilters> = FilterState::new();
        let initial = query(state.applied().clone()).to_params();

        state.draft_mut().driver_id = Some(7);
        state.draft_mut().start_date = NaiveDate::from_ymd_opt(2025, 1, 1);
        state.apply();
        assert_ne!(query(state.applied().clone()).to_params(), initial);

        state.clear();
        state.apply();
        assert_eq!(query(state.applied().clone()).to_params(), initial);
    }

    #[test]
    fn blank_customer_name_is_not_sent() {
        let filters = ChargeFilters {
            customer_name: Some("   ".to_string()),
            paid: Some(true),
            ..Default::default()
        };
        let params = query(filters).to_params();
        assert!(params.iter().all(|(k, _)| *k != "customerName"));
        assert!(params.contains(&("paid", "true".to_string())));
        assert!(params.contains(&("sortDir", "desc".to_string())));
    }
}
