//! XML reading helpers (roxmltree) and the document writer (quick-xml).

mod utils;
mod writer;

pub use utils::{
    anchor_href, character_string, element_children, find_by_path, find_child, find_children,
    find_descendants, get_attribute, get_tag_name, get_text, has_tag, text_at,
};
pub use writer::XmlWriter;
