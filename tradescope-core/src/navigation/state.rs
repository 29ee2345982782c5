//! Drill-down navigation states.
//!
//! Category → series → ticker, one level at a time. Each state carries the
//! selections that led to it so `back()` can rebuild its parent.

/// Where the operator is in the catalogue hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NavigationState {
    /// Category list (top level)
    #[default]
    AtCategories,

    /// Series in one category
    AtSeriesList { category: String },

    /// Tickers of one series
    AtTickerList { series: String, category: String },

    /// A concrete ticker, ready for a trade fetch
    TickerSelected {
        ticker: String,
        series: String,
        category: String,
    },
}

impl NavigationState {
    pub fn category(&self) -> Option<&str> {
        match self {
            NavigationState::AtCategories => None,
            NavigationState::AtSeriesList { category }
            | NavigationState::AtTickerList { category, .. }
            | NavigationState::TickerSelected { category, .. } => Some(category),
        }
    }

    pub fn series(&self) -> Option<&str> {
        match self {
            NavigationState::AtTickerList { series, .. }
            | NavigationState::TickerSelected { series, .. } => Some(series),
            _ => None,
        }
    }

    /// The ticker a trade fetch would use. Only set once a ticker is chosen.
    pub fn ticker(&self) -> Option<&str> {
        match self {
            NavigationState::TickerSelected { ticker, .. } => Some(ticker),
            _ => None,
        }
    }

    pub fn is_top_level(&self) -> bool {
        matches!(self, NavigationState::AtCategories)
    }

    /// 0 at categories, 3 with a ticker selected.
    pub fn depth(&self) -> usize {
        match self {
            NavigationState::AtCategories => 0,
            NavigationState::AtSeriesList { .. } => 1,
            NavigationState::AtTickerList { .. } => 2,
            NavigationState::TickerSelected { .. } => 3,
        }
    }

    /// The immediate parent, or `None` at the top.
    pub fn parent(&self) -> Option<NavigationState> {
        match self {
            NavigationState::AtCategories => None,
            NavigationState::AtSeriesList { .. } => Some(NavigationState::AtCategories),
            NavigationState::AtTickerList { category, .. } => {
                Some(NavigationState::AtSeriesList {
                    category: category.clone(),
                })
            }
            NavigationState::TickerSelected {
                series, category, ..
            } => Some(NavigationState::AtTickerList {
                series: series.clone(),
                category: category.clone(),
            }),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            NavigationState::AtCategories => "at categories",
            NavigationState::AtSeriesList { .. } => "at series list",
            NavigationState::AtTickerList { .. } => "at ticker list",
            NavigationState::TickerSelected { .. } => "with a ticker selected",
        }
    }

    /// `Economics › CPI › CPI-24-T1`
    pub fn breadcrumb(&self) -> String {
        let mut parts = vec!["Categories"];
        parts.extend(self.category());
        parts.extend(self.series());
        parts.extend(self.ticker());
        parts.join(" › ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selected() -> NavigationState {
        NavigationState::TickerSelected {
            ticker: "CPI-24-T1".into(),
            series: "CPI".into(),
            category: "Economics".into(),
        }
    }

    #[test]
    fn test_accessors() {
        let s = selected();
        assert_eq!(s.category(), Some("Economics"));
        assert_eq!(s.series(), Some("CPI"));
        assert_eq!(s.ticker(), Some("CPI-24-T1"));
        assert_eq!(NavigationState::AtCategories.category(), None);
        let list = NavigationState::AtTickerList {
            series: "CPI".into(),
            category: "Economics".into(),
        };
        assert_eq!(list.ticker(), None);
    }

    #[test]
    fn test_parent_chain() {
        let mut s = selected();
        let mut depths = vec![s.depth()];
        while let Some(p) = s.parent() {
            depths.push(p.depth());
            s = p;
        }
        assert_eq!(depths, [3, 2, 1, 0]);
        assert!(s.is_top_level());
    }

    #[test]
    fn test_breadcrumb() {
        assert_eq!(selected().breadcrumb(), "Categories › Economics › CPI › CPI-24-T1");
        assert_eq!(NavigationState::AtCategories.breadcrumb(), "Categories");
    }
}
