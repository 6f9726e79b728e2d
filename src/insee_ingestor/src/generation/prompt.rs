//! Prompt construction from a table excerpt.

use crate::{generation::ChatMessage, models::SeriesTable};

pub const EMPTY_DATASET: &str = "The dataset is empty.";

/// Renders the first `max_rows` rows as an aligned text table.
pub fn table_to_context(table: &SeriesTable, max_rows: usize) -> String {
    if table.is_empty() {
        return EMPTY_DATASET.to_string();
    }
    table.render(Some(max_rows)).trim_end().to_string()
}

/// System instruction followed by the data excerpt and the question.
pub fn build_messages(
    system_prompt: &str,
    table: &SeriesTable,
    question: &str,
    max_rows: usize,
) -> Vec<ChatMessage> {
    let context = table_to_context(table, max_rows);
    vec![
        ChatMessage::system(system_prompt),
        ChatMessage::user(format!(
            "Data context:\n{context}\n\nQuestion:\n{question}"
        )),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{generation::Role, models::Observation};

    fn rows(n: usize) -> SeriesTable {
        SeriesTable::new(
            (0..n)
                .map(|i| Observation {
                    idbank: "010565692".into(),
                    date: format!("{}", 2000 + i),
                    value: Some(i as f64),
                })
                .collect(),
        )
    }

    #[test]
    fn empty_table_gets_a_sentence() {
        assert_eq!(table_to_context(&SeriesTable::default(), 5), EMPTY_DATASET);
    }

    #[test]
    fn context_is_capped() {
        let ctx = table_to_context(&rows(8), 5);
        assert!(ctx.contains("2004"));
        assert!(!ctx.contains("2005"));
        assert!(ctx.ends_with("... 3 more rows"));
    }

    #[test]
    fn messages_layout() {
        let msgs = build_messages("Be brief.", &rows(1), "What is the value in 2000?", 5);
        assert_eq!(msgs[0], ChatMessage::system("Be brief."));
        assert_eq!(msgs[1].role, Role::User);
        assert_eq!(
            msgs[1].content,
            "Data context:\ndate  value\n2000      0\n\nQuestion:\nWhat is the value in 2000?"
        );
    }
}
