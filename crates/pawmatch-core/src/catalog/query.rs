//! Remote search query derived from the current search state.

use crate::search::{Filter, PageKey, SortOrder};

/// Query parameters for `GET /dogs/search`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub breeds: Vec<String>,
    pub zip_codes: Vec<String>,
    pub age_min: u32,
    pub age_max: u32,
    pub sort: SortOrder,
    pub size: u32,
    pub from: u64,
}

impl SearchQuery {
    /// Builds the query for a filter and the result offset `from`.
    pub fn new(filter: &Filter, from: u64) -> Self {
        Self {
            breeds: filter.breeds.iter().cloned().collect(),
            zip_codes: filter.zip_codes.clone().unwrap_or_default(),
            age_min: filter.age_min,
            age_max: filter.age_max,
            sort: filter.sort,
            size: filter.page_size,
            from,
        }
    }

    /// Query-string pairs. Array criteria repeat their key; empty arrays are
    /// omitted entirely.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(self.breeds.len() + self.zip_codes.len() + 5);
        for breed in &self.breeds {
            pairs.push(("breeds", breed.clone()));
        }
        for zip in &self.zip_codes {
            pairs.push(("zipCodes", zip.clone()));
        }
        pairs.push(("ageMin", self.age_min.to_string()));
        pairs.push(("ageMax", self.age_max.to_string()));
        pairs.push(("sort", self.sort.to_string()));
        pairs.push(("size", self.size.to_string()));
        pairs.push(("from", self.from.to_string()));
        pairs
    }
}

impl From<&PageKey> for SearchQuery {
    fn from(key: &PageKey) -> Self {
        Self::new(&key.filter, key.offset())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{FilterUpdate, PageCursor};

    #[test]
    fn test_default_query_pairs() {
        let query = SearchQuery::new(&Filter::default(), 0);
        assert_eq!(
            query.to_pairs(),
            vec![
                ("ageMin", "0".to_string()),
                ("ageMax", "20".to_string()),
                ("sort", "breed:asc".to_string()),
                ("size", "20".to_string()),
                ("from", "0".to_string()),
            ]
        );
    }

    #[test]
    fn test_from_page_key_uses_offset() {
        let mut filter = Filter::default();
        filter
            .apply(FilterUpdate {
                breeds: Some(["Boxer".to_string(), "Akita".to_string()].into()),
                zip_codes: Some(Some(vec!["02139".into()])),
                page_size: Some(10),
                ..Default::default()
            })
            .unwrap();
        let key = PageKey::new(filter, PageCursor::new(4).unwrap());

        let query = SearchQuery::from(&key);
        assert_eq!(query.from, 30);
        assert_eq!(query.size, 10);

        let pairs = query.to_pairs();
        assert_eq!(pairs[0], ("breeds", "Akita".to_string()));
        assert_eq!(pairs[1], ("breeds", "Boxer".to_string()));
        assert_eq!(pairs[2], ("zipCodes", "02139".to_string()));
    }
}
