#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

//! Publish markdown files with YAML front matter as posts.
//!
//! A post file looks like this:
//!
//! ```markdown
//! ---
//! post_title: Useful Git commands
//! post_status: publish
//! post_category:
//!   - git
//! description: Commands worth remembering
//! ---
//!
//! Body text
//! ```
//!
//! [`publish::create_post`] submits it to a [`store::ContentStore`] and writes
//! the assigned `ID` back into the file; [`publish::update_post`] pushes later
//! edits of the body to the same post.

pub mod config;
pub mod frontmatter;
pub mod post;
pub mod publish;
pub mod store;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
