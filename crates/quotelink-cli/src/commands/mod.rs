pub mod delete;
pub mod list;
pub mod submit;
pub mod watch;

use quotelink_engine::LinkItem;

/// One line per item: id, status, share link (or `-`), quote
pub fn render_items(items: &[LinkItem]) -> String {
    if items.is_empty() {
        return "No quote links.\n".to_string();
    }
    items
        .iter()
        .map(|item| {
            format!(
                "{}\t{:?}\t{}\t{}\n",
                item.id,
                item.status,
                item.share_link.as_deref().unwrap_or("-"),
                item.quote
            )
        })
        .collect()
}
