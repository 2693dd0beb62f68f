use serde::Serialize;
use std::collections::HashMap;

/// Raw counts of one crosstab row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrosstabRow {
    pub group: String,
    /// One count per category, in the crosstab's category order.
    pub counts: Vec<u64>,
    pub total: u64,
}

/// Percentage view of one crosstab row. A row with zero total renders as
/// 0% everywhere instead of failing the division.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercentageRow {
    pub group: String,
    pub values: Vec<f64>,
}

/// Cross-tabulation of (group, category) observations with a fixed,
/// caller-supplied category order. Every ordered category is present as a
/// column even with zero observations, so the output shape is stable for
/// charting regardless of data sparsity. Observations outside the order
/// are not counted. Rows come sorted descending by total, stable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Crosstab {
    pub categories: Vec<String>,
    pub rows: Vec<CrosstabRow>,
}

/// Build a crosstab from (group, category) pairs. Group order of ties is
/// first appearance in the input.
pub fn crosstab<I>(pairs: I, category_order: &[&str]) -> Crosstab
where
    I: IntoIterator<Item = (String, String)>,
{
    let category_index: HashMap<&str, usize> = category_order
        .iter()
        .enumerate()
        .map(|(i, c)| (*c, i))
        .collect();

    let mut group_index: HashMap<String, usize> = HashMap::new();
    let mut rows: Vec<CrosstabRow> = Vec::new();
    for (group, category) in pairs {
        let row_i = *group_index.entry(group.clone()).or_insert_with(|| {
            rows.push(CrosstabRow {
                group,
                counts: vec![0; category_order.len()],
                total: 0,
            });
            rows.len() - 1
        });
        if let Some(&cat_i) = category_index.get(category.as_str()) {
            rows[row_i].counts[cat_i] += 1;
            rows[row_i].total += 1;
        }
    }

    rows.sort_by(|a, b| b.total.cmp(&a.total));
    Crosstab {
        categories: category_order.iter().map(|c| c.to_string()).collect(),
        rows,
    }
}

impl Crosstab {
    /// Parallel percentage table: counts over the row total, times 100.
    pub fn percentages(&self) -> Vec<PercentageRow> {
        self.rows
            .iter()
            .map(|row| PercentageRow {
                group: row.group.clone(),
                values: row
                    .counts
                    .iter()
                    .map(|&c| {
                        if row.total == 0 {
                            0.0
                        } else {
                            c as f64 / row.total as f64 * 100.0
                        }
                    })
                    .collect(),
            })
            .collect()
    }

    /// Per-category totals across all rows (the `Total Geral` row of
    /// summary pivots).
    pub fn column_totals(&self) -> Vec<u64> {
        let mut totals = vec![0u64; self.categories.len()];
        for row in &self.rows {
            for (t, c) in totals.iter_mut().zip(&row.counts) {
                *t += c;
            }
        }
        totals
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Stable re-sort of the rows by a caller-supplied descending key,
    /// keeping only the first `top` rows. Used by views ranked on
    /// specific columns rather than on the total.
    pub fn sorted_desc_by_columns(mut self, columns: &[&str], top: usize) -> Crosstab {
        let idx: Vec<usize> = columns
            .iter()
            .filter_map(|c| self.categories.iter().position(|cat| cat == c))
            .collect();
        self.rows.sort_by(|a, b| {
            let key = |r: &CrosstabRow| idx.iter().map(|&i| r.counts[i]).collect::<Vec<_>>();
            key(b).cmp(&key(a))
        });
        self.rows.truncate(top);
        self
    }

    /// Keep only the first `top` rows (rows are already total-ordered).
    pub fn top(mut self, top: usize) -> Crosstab {
        self.rows.truncate(top);
        self
    }
}

/// Crosstab over the distinct categories observed in the input, in first
/// appearance order, for views without a closed category set.
pub fn crosstab_observed<I>(pairs: I) -> Crosstab
where
    I: IntoIterator<Item = (String, String)> + Clone,
{
    let mut order: Vec<String> = Vec::new();
    for (_, category) in pairs.clone() {
        if !order.contains(&category) {
            order.push(category);
        }
    }
    let refs: Vec<&str> = order.iter().map(String::as_str).collect();
    crosstab(pairs, &refs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(data: &[(&str, &str)]) -> Vec<(String, String)> {
        data.iter()
            .map(|(g, c)| (g.to_string(), c.to_string()))
            .collect()
    }

    #[test]
    fn test_zero_fill_and_fixed_order() {
        let tab = crosstab(
            pairs(&[("UBS A", "COM CPF"), ("UBS A", "COM CPF")]),
            &["COM CPF", "SEM CPF"],
        );
        assert_eq!(tab.categories, vec!["COM CPF", "SEM CPF"]);
        assert_eq!(tab.rows[0].counts, vec![2, 0]);
        assert_eq!(tab.rows[0].total, 2);
    }

    #[test]
    fn test_rows_sorted_descending_by_total_stable() {
        let tab = crosstab(
            pairs(&[
                ("UBS A", "X"),
                ("UBS B", "X"),
                ("UBS C", "X"),
                ("UBS B", "X"),
            ]),
            &["X"],
        );
        let groups: Vec<&str> = tab.rows.iter().map(|r| r.group.as_str()).collect();
        // B leads; A and C tie at 1 and keep input order.
        assert_eq!(groups, vec!["UBS B", "UBS A", "UBS C"]);
    }

    #[test]
    fn test_unlisted_categories_are_not_counted() {
        let tab = crosstab(
            pairs(&[("UBS A", "COM CPF"), ("UBS A", "OUTRO VALOR")]),
            &["COM CPF", "SEM CPF"],
        );
        assert_eq!(tab.rows[0].counts, vec![1, 0]);
        assert_eq!(tab.rows[0].total, 1);
    }

    #[test]
    fn test_percentages_sum_to_100() {
        let tab = crosstab(
            pairs(&[
                ("UBS A", "COM CPF"),
                ("UBS A", "SEM CPF"),
                ("UBS A", "COM CPF"),
            ]),
            &["COM CPF", "SEM CPF"],
        );
        let pct = tab.percentages();
        let sum: f64 = pct[0].values.iter().sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_percentages_of_empty_row_are_zero() {
        // A group whose only observations fall outside the fixed order
        // ends up with total 0.
        let tab = crosstab(pairs(&[("UBS A", "OUTRO")]), &["COM CPF", "SEM CPF"]);
        let pct = tab.percentages();
        assert_eq!(pct[0].values, vec![0.0, 0.0]);
    }

    #[test]
    fn test_column_totals() {
        let tab = crosstab(
            pairs(&[("UBS A", "X"), ("UBS B", "X"), ("UBS B", "Y")]),
            &["X", "Y"],
        );
        assert_eq!(tab.column_totals(), vec![2, 1]);
    }

    #[test]
    fn test_observed_categories_keep_appearance_order() {
        let tab = crosstab_observed(pairs(&[("UBS A", "SIM"), ("UBS B", "NÃO"), ("UBS A", "SIM")]));
        assert_eq!(tab.categories, vec!["SIM", "NÃO"]);
    }

    #[test]
    fn test_sorted_desc_by_columns() {
        let tab = crosstab(
            pairs(&[
                ("UBS A", "URG"),
                ("UBS B", "DIA"),
                ("UBS B", "DIA"),
                ("UBS C", "URG"),
                ("UBS C", "URG"),
            ]),
            &["URG", "DIA"],
        )
        .sorted_desc_by_columns(&["URG", "DIA"], 2);
        let groups: Vec<&str> = tab.rows.iter().map(|r| r.group.as_str()).collect();
        assert_eq!(groups, vec!["UBS C", "UBS A"]);
    }
}
