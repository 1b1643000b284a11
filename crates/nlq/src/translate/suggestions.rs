/// Example questions for discoverability. Not derived from the rule table, and not
/// every entry is guaranteed to hit a rule.
pub const SUGGESTIONS: &[&str] = &[
    "Top 5 errors for the last 24 hours",
    "Show all failed test runs from last week",
    "Which integrations are inactive",
    "List all agents using Gujarati language",
    "Show all workspaces",
    "Workspaces by plan",
    "How many agents",
    "Errors by source",
    "Agent runs by status",
    "Billing by workspace",
    "Top 10 token users",
    "Show errors for last 7 days",
    "List all agents",
    "Show successful test runs",
];

#[must_use]
pub fn suggestions() -> &'static [&'static str] {
    SUGGESTIONS
}
