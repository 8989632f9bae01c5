use crate::generation::template::PromptTemplate;
use crate::mapping::MappingSet;
use crate::utils::flatten_cell;
use std::sync::OnceLock;
use tiktoken_rs::{cl100k_base, CoreBPE};

pub const MAPPING_HEADER: &str = "ETL Mapping Document:";

const FIELD_SEPARATOR: &str = " | ";

/// Renders the template followed by one pipe-delimited line per mapping row.
pub fn build(template: &PromptTemplate, rows: &MappingSet) -> String {
    let mut prompt = String::with_capacity(template.text().len() + rows.len() * 64 + 32);

    prompt.push_str(template.text());
    prompt.push_str("\n\n");
    prompt.push_str(MAPPING_HEADER);
    prompt.push('\n');

    for record in rows {
        let line: Vec<String> = record.fields().iter().map(|f| flatten_cell(f)).collect();
        prompt.push_str(&line.join(FIELD_SEPARATOR));
        prompt.push('\n');
    }

    prompt
}

/// Rough token count of a prompt. cl100k is not the backend's tokenizer, so
/// this is only a size hint.
pub fn estimate_tokens(text: &str) -> usize {
    match encoder() {
        Some(bpe) => bpe.encode_with_special_tokens(text).len(),
        None => text.len() / 4,
    }
}

/// Built on first use and shared afterwards.
fn encoder() -> Option<&'static CoreBPE> {
    static CL100K: OnceLock<Option<CoreBPE>> = OnceLock::new();
    CL100K.get_or_init(|| cl100k_base().ok()).as_ref()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::MappingRecord;

    fn record(fields: [&str; 5]) -> MappingRecord {
        MappingRecord::from_fields(fields.map(String::from))
    }

    fn data_lines(prompt: &str) -> Vec<&str> {
        let (_, data) = prompt
            .split_once(&format!("{MAPPING_HEADER}\n"))
            .expect("header line present");
        data.lines().collect()
    }

    #[test]
    fn renders_rows_in_order() {
        let template = PromptTemplate::new("Generate SQL.");
        let rows: MappingSet = vec![
            record(["orders", "id", "fact_orders", "order_id", "passthrough"]),
            record(["orders", "amt", "fact_orders", "amount", "cast decimal"]),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            build(&template, &rows),
            "Generate SQL.\n\nETL Mapping Document:\n\
             orders | id | fact_orders | order_id | passthrough\n\
             orders | amt | fact_orders | amount | cast decimal\n"
        );
    }

    #[test]
    fn empty_set_yields_template_and_header_only() {
        let template = PromptTemplate::new("Generate SQL.");
        let prompt = build(&template, &MappingSet::default());

        assert_eq!(prompt, "Generate SQL.\n\nETL Mapping Document:\n");
        assert!(data_lines(&prompt).is_empty());
    }

    #[test]
    fn every_line_has_four_separators() {
        let template = PromptTemplate::new("T");
        let rows: MappingSet = vec![
            record(["", "", "", "", ""]),
            record(["a|b", "multi\nline", "t", "c", "CASE WHEN x || y\r\nEND"]),
            record(["s", "c", "t", "c", "coalesce(a, '')"]),
        ]
        .into_iter()
        .collect();

        let prompt = build(&template, &rows);
        let lines = data_lines(&prompt);

        assert_eq!(lines.len(), rows.len());
        for line in lines {
            assert_eq!(line.matches('|').count(), 4, "line: {line:?}");
        }
    }

    #[test]
    fn missing_values_render_as_empty_fields() {
        let template = PromptTemplate::new("T");
        let rows: MappingSet = vec![record(["stg", "", "tgt", "", ""])].into_iter().collect();

        let prompt = build(&template, &rows);
        assert_eq!(data_lines(&prompt), vec!["stg |  | tgt |  | "]);
    }

    #[test]
    fn encoder_is_built_once() {
        let first = encoder().expect("cl100k available");
        let second = encoder().expect("cl100k available");
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn cell_bars_keep_four_separators_and_concatenation() {
        let template = PromptTemplate::new("T");
        let rows: MappingSet = vec![record([
            "s",
            "c",
            "t",
            "full_name",
            "first_name || ' ' || last_name",
        ])]
        .into_iter()
        .collect();

        let prompt = build(&template, &rows);
        let lines = data_lines(&prompt);

        assert_eq!(lines[0].matches('|').count(), 4);
        assert!(lines[0].ends_with("first_name \u{a6}\u{a6} ' ' \u{a6}\u{a6} last_name"));
        assert!(!lines[0].contains('/'));
    }

    #[test]
    fn token_estimate_grows_with_text() {
        let short = estimate_tokens("SELECT 1;");
        let long = estimate_tokens(&"SELECT COUNT(*) FROM fact_orders; ".repeat(20));
        assert!(short > 0);
        assert!(long > short);
    }
}
