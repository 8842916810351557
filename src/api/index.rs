use axum::response::Html;

/// Single static page, embedded at compile time. Styling is intentionally
/// minimal; the page only posts to the analyze endpoint and renders the JSON
/// result.
pub(crate) async fn page() -> Html<&'static str> {
    Html(include_str!("../../demos/index.html"))
}
