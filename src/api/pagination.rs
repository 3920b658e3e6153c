use serde::Deserialize;

/// `?limit=&page=` query parameters; pages start at 1
#[derive(Debug, Default, Deserialize)]
pub struct Paging {
    pub limit: Option<i64>,
    pub page: Option<i64>,
}

impl Paging {
    /// Resolve to `(limit, offset)`, clamping the limit to `1..=max`
    pub fn resolve(&self, default_limit: i64, max_limit: i64) -> (i64, i64) {
        let limit = self
            .limit
            .filter(|l| *l > 0)
            .unwrap_or(default_limit)
            .min(max_limit);
        let page = self.page.filter(|p| *p > 0).unwrap_or(1);
        (limit, (page - 1).saturating_mul(limit))
    }
}

/// Treat empty or blank filter strings as absent
pub fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_clamping() {
        assert_eq!(Paging::default().resolve(50, 500), (50, 0));
        let paging = Paging { limit: Some(10_000), page: Some(3) };
        assert_eq!(paging.resolve(50, 500), (500, 1000));
        let paging = Paging { limit: Some(-4), page: Some(0) };
        assert_eq!(paging.resolve(50, 500), (50, 0));
    }

    #[test]
    fn blank_filters_are_absent() {
        assert_eq!(non_blank(&Some("  ".into())), None);
        assert_eq!(non_blank(&Some(" nurse ".into())), Some("nurse".into()));
        assert_eq!(non_blank(&None), None);
    }
}
