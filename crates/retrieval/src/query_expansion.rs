//! Query expansion for improved recall
//!
//! Dictionary-based expansion with bilingual (Korean/English) power-grid
//! terminology. A pure function over the query: keywords are matched by
//! substring containment (case-insensitive for ASCII, exact for Korean),
//! and a bounded number of expansion tokens is appended to the original
//! query. No match returns the query unchanged.

/// Query expansion configuration
#[derive(Debug, Clone)]
pub struct QueryExpansionConfig {
    /// Expansion tokens considered per matched keyword
    pub max_terms_per_keyword: usize,
    /// Expansion tokens appended per query
    pub max_added_terms: usize,
}

impl Default for QueryExpansionConfig {
    fn default() -> Self {
        Self {
            max_terms_per_keyword: 3,
            max_added_terms: 5,
        }
    }
}

/// Bilingual keyword → expansion phrases for the power grid domain.
///
/// Entry order is match order, which makes expansion deterministic.
const KEYWORD_MAP: &[(&str, &str)] = &[
    // English technical terms
    ("transformer", "변압기 substation voltage equipment insulating oil"),
    ("renewable energy", "재생에너지 신재생 solar wind VRE variable"),
    ("HVDC", "직류송전 high voltage direct current transmission VSC LCC BTB"),
    ("grid", "전력망 송전망 배전망 power system network transmission distribution"),
    ("stability", "안정도 frequency voltage control dynamic"),
    ("ESS", "에너지저장 energy storage battery BESS"),
    ("inverter", "인버터 converter grid-forming grid-following"),
    ("transmission", "송전 송전선로 765kV 345kV line tower conductor"),
    ("distribution", "배전 DC AC system network"),
    ("generator", "발전 발전기 synchronous turbine power plant"),
    ("market", "시장 전력시장 SMP CBP electricity trading"),
    ("smart grid", "스마트그리드 지능형전력망 automation SCADA"),
    ("nuclear", "원자력 nuclear power plant reactor"),
    ("coal", "석탄 coal plant thermal"),
    ("curtailment", "출력제한 제약 curtailment limitation"),
    // Korean technical terms
    ("재생에너지", "renewable solar wind VRE 태양광 풍력"),
    ("전력망", "grid power system 송전망 배전망 transmission"),
    ("변압기", "transformer substation 변전소 voltage"),
    ("송전", "transmission line 송전선로 765kV 345kV HVDC"),
    ("안정도", "stability frequency voltage control 주파수 전압"),
    ("에너지저장", "ESS energy storage battery BESS 배터리"),
    ("전력시장", "electricity market SMP CBP trading 거래"),
    ("한전", "KEPCO KPX 전력거래소 utility"),
    ("스마트그리드", "smart grid automation 자동화 SCADA DAS"),
    ("제주", "Jeju island 해남 HVDC interconnection"),
    ("동기조상기", "synchronous condenser compensator reactive"),
    ("출력제한", "curtailment limitation VRE constraint"),
    ("전력수급", "electricity supply demand BPLE planning"),
    // Specific entities
    ("KPX", "전력거래소 Korea Power Exchange market operator KEPCO"),
    ("KEPCO", "한전 Korea Electric Power utility transmission"),
    ("insulating oil", "절연유 transformer oil dielectric"),
    ("PyPSA", "power system analysis toolbox optimization"),
    ("765kV", "transmission line 송전선로 ultra high voltage"),
    ("CBP", "cost-based pool 비용기반풀 market pricing SMP"),
    ("SMP", "system marginal price 계통한계가격 market"),
    ("EMSC", "전력시장감시위원회 market monitoring surveillance"),
    ("SCADA", "supervisory control 감시제어 automation DAS"),
    ("VRE", "variable renewable energy 변동성재생에너지 solar wind"),
    ("BPLE", "전력수급기본계획 basic plan electricity supply demand"),
];

/// Dictionary-based query expander
pub struct QueryExpander {
    config: QueryExpansionConfig,
    entries: Vec<(String, String)>,
}

impl QueryExpander {
    /// Create an expander with a custom dictionary.
    pub fn new(config: QueryExpansionConfig, entries: Vec<(String, String)>) -> Self {
        Self { config, entries }
    }

    /// Create with the built-in power grid dictionary.
    pub fn power_grid() -> Self {
        Self::new(
            QueryExpansionConfig::default(),
            KEYWORD_MAP
                .iter()
                .map(|(keyword, expansion)| (keyword.to_string(), expansion.to_string()))
                .collect(),
        )
    }

    /// Add a custom keyword expansion.
    pub fn add_keyword(&mut self, keyword: impl Into<String>, expansion: impl Into<String>) {
        self.entries.push((keyword.into(), expansion.into()));
    }

    /// Expand a query with dictionary terms.
    ///
    /// Matched keywords contribute up to `max_terms_per_keyword` tokens each,
    /// skipping tokens already present in the query; at most
    /// `max_added_terms` tokens are appended, in match order.
    pub fn expand(&self, query: &str) -> String {
        let query_lower = query.to_lowercase();
        let mut added: Vec<&str> = Vec::new();

        'entries: for (keyword, expansion) in &self.entries {
            let matched = if keyword.is_ascii() {
                query_lower.contains(&keyword.to_lowercase())
            } else {
                query.contains(keyword.as_str())
            };
            if !matched {
                continue;
            }

            for term in expansion
                .split_whitespace()
                .take(self.config.max_terms_per_keyword)
            {
                if query_lower.contains(&term.to_lowercase()) {
                    continue;
                }
                if added.contains(&term) {
                    continue;
                }
                added.push(term);
                if added.len() == self.config.max_added_terms {
                    break 'entries;
                }
            }
        }

        if added.is_empty() {
            return query.to_string();
        }

        tracing::debug!(query, added = added.len(), "query expanded");
        format!("{} {}", query, added.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_match_returns_query_unchanged() {
        let expander = QueryExpander::power_grid();
        assert_eq!(
            expander.expand("how do I cook rice"),
            "how do I cook rice"
        );
    }

    #[test]
    fn test_english_keyword_expands() {
        let expander = QueryExpander::power_grid();
        let expanded = expander.expand("transformer maintenance schedule");

        assert!(expanded.starts_with("transformer maintenance schedule "));
        assert!(expanded.contains("변압기"));
        assert!(expanded.contains("substation"));
        assert!(expanded.contains("voltage"));
    }

    #[test]
    fn test_ascii_match_is_case_insensitive() {
        let expander = QueryExpander::power_grid();
        let expanded = expander.expand("What is HVDC?");
        assert!(expanded.contains("직류송전"));

        let lower = expander.expand("what is hvdc?");
        assert!(lower.contains("직류송전"));
    }

    #[test]
    fn test_korean_keyword_matches_exactly() {
        let expander = QueryExpander::power_grid();
        let expanded = expander.expand("변압기 점검 주기");

        assert!(expanded.contains("transformer"));
        assert!(expanded.contains("substation"));
    }

    #[test]
    fn test_terms_already_in_query_are_skipped() {
        let expander = QueryExpander::power_grid();
        // "substation" and "voltage" are the 2nd and 3rd expansion tokens
        let expanded = expander.expand("transformer substation voltage check");

        let added: Vec<&str> = expanded
            .strip_prefix("transformer substation voltage check")
            .unwrap()
            .split_whitespace()
            .collect();
        assert!(added.contains(&"변압기"));
        assert!(!added.contains(&"substation"));
        assert!(!added.contains(&"voltage"));
    }

    #[test]
    fn test_at_most_five_terms_added() {
        let expander = QueryExpander::power_grid();
        // matches "transformer", "grid", and "stability"
        let query = "transformer grid stability";
        let expanded = expander.expand(query);

        let added = expanded.strip_prefix(query).unwrap();
        assert_eq!(added.split_whitespace().count(), 5);
    }

    #[test]
    fn test_at_most_three_terms_per_keyword() {
        let expander = QueryExpander::power_grid();
        let expanded = expander.expand("inverter");

        // expansion phrase has four tokens; only the first three qualify
        assert!(expanded.contains("인버터"));
        assert!(expanded.contains("converter"));
        assert!(expanded.contains("grid-forming"));
        assert!(!expanded.contains("grid-following"));
    }

    #[test]
    fn test_duplicate_terms_added_once() {
        let mut expander = QueryExpander::new(QueryExpansionConfig::default(), Vec::new());
        expander.add_keyword("relay", "protection breaker");
        expander.add_keyword("breaker", "protection switchgear");

        let expanded = expander.expand("relay breaker coordination");
        let added: Vec<&str> = expanded
            .strip_prefix("relay breaker coordination ")
            .unwrap()
            .split_whitespace()
            .collect();
        assert_eq!(added, vec!["protection", "switchgear"]);
    }

    #[test]
    fn test_expansion_order_is_match_order() {
        let expander = QueryExpander::power_grid();
        let expanded = expander.expand("transformer market");

        let added: Vec<&str> = expanded
            .strip_prefix("transformer market ")
            .unwrap()
            .split_whitespace()
            .collect();
        // "transformer" entry precedes "market" in the dictionary
        assert_eq!(added, vec!["변압기", "substation", "voltage", "시장", "전력시장"]);
    }
}
