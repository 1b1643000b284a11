use tracing::debug;

use crate::catalog::SchemaCatalog;
use crate::models::{KEYWORD_FALLBACK_RULE, NO_MATCH_REASON, Translation};

/// Bounded `SELECT *` over the first catalog table named in the question.
///
/// A question naming several tables resolves to the one declared first in the
/// catalog, whatever the phrasing suggests.
#[must_use]
pub fn keyword_query(normalized_question: &str, catalog: &SchemaCatalog, row_limit: u32) -> Translation {
    let Some(table) = catalog.first_mentioned_table(normalized_question) else {
        debug!("no rule or table keyword matched the question");
        return Translation::no_match(NO_MATCH_REASON);
    };

    debug!(table, "keyword fallback selected table");
    Translation::translated(
        format!("SELECT * FROM {table} LIMIT {row_limit}"),
        format!("Showing data from {table} table"),
        KEYWORD_FALLBACK_RULE,
    )
}
