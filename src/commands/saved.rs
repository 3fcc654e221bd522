//! Saved posts from the shell

use anyhow::Result;
use std::io::Write;

use crate::content::{ContentSource, PostId};
use crate::saved::SavedRegistry;
use crate::Storyfront;

/// What to do with the saved set
#[derive(Debug, Clone)]
pub enum SavedAction {
    List { resolve: bool },
    Add(String),
    Remove(String),
    Toggle(String),
}

pub async fn run(site: &Storyfront, action: SavedAction) -> Result<()> {
    let registry = site.registry(false);
    let mut out = std::io::stdout();

    match action {
        SavedAction::List { resolve: true } => {
            let source = site.content_source()?;
            list(&mut out, &registry, Some(source.as_ref())).await
        }
        SavedAction::List { resolve: false } => list(&mut out, &registry, None).await,
        action => apply(&mut out, &registry, action),
    }
}

async fn list<W: Write>(
    out: &mut W,
    registry: &SavedRegistry,
    source: Option<&dyn ContentSource>,
) -> Result<()> {
    let ids: Vec<PostId> = registry.query_all().into_iter().collect();
    if ids.is_empty() {
        writeln!(out, "No saved posts.")?;
        return Ok(());
    }

    writeln!(out, "Saved posts ({}):", ids.len())?;
    match source {
        Some(source) => {
            let posts = source.get_posts_by_ids(&ids).await?;
            for id in &ids {
                match posts.iter().find(|p| &p.id == id) {
                    Some(post) => writeln!(out, "  {} - {}", id, post.title)?,
                    None => writeln!(out, "  {} - (not found)", id)?,
                }
            }
        }
        None => {
            for id in &ids {
                writeln!(out, "  {}", id)?;
            }
        }
    }

    Ok(())
}

fn apply<W: Write>(out: &mut W, registry: &SavedRegistry, action: SavedAction) -> Result<()> {
    let raw = match &action {
        SavedAction::Add(id) | SavedAction::Remove(id) | SavedAction::Toggle(id) => id,
        SavedAction::List { .. } => return Ok(()),
    };
    let id = PostId::new(raw);
    if !id.is_valid() {
        anyhow::bail!("Post id must not be empty");
    }

    match action {
        SavedAction::Add(_) => {
            if registry.add(&id) {
                writeln!(out, "Saved {}", id)?;
            } else {
                writeln!(out, "{} was already saved", id)?;
            }
        }
        SavedAction::Remove(_) => {
            if registry.remove(&id) {
                writeln!(out, "Removed {}", id)?;
            } else {
                writeln!(out, "{} was not saved", id)?;
            }
        }
        SavedAction::Toggle(_) => {
            if registry.toggle(&id) {
                writeln!(out, "Saved {}", id)?;
            } else {
                writeln!(out, "Removed {}", id)?;
            }
        }
        SavedAction::List { .. } => {}
    }

    Ok(())
}
