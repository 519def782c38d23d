//! Subcommand implementations

use anyhow::{anyhow, Context, Result};
use futures::future::try_join_all;

use mediatree_core::{ItemId, ItemSource, LazyLoader, NavigationStore, NodeRef};

/// Emby time unit: 100 ns
const TICKS_PER_SECOND: f64 = 10_000_000.0;

/// Walk `path` from the library root, then print the tree below the node
/// reached, `depth` levels deep. A leaf at the end of the path is shown with
/// its detail instead.
pub async fn tree(loader: &LazyLoader, store: &mut NavigationStore, path: &[String], depth: usize) -> Result<()> {
    for segment in path {
        let current = store
            .current()
            .cloned()
            .ok_or_else(|| anyhow!("No library root"))?;
        let children = loader
            .children_of(&current, false)
            .await
            .with_context(|| format!("Failed to list {}", current.title()))?;

        let wanted = segment.to_lowercase();
        let child = children
            .iter()
            .find(|child| child.id().as_str() == segment.as_str() || child.title().to_lowercase() == wanted)
            .ok_or_else(|| anyhow!("No entry named {segment} under {}", current.title()))?;
        let opened = store
            .select_child(child.id())
            .ok_or_else(|| anyhow!("{} is no longer listed under {}", child.title(), current.title()))?;
        tracing::debug!(node_id = %opened.id(), depth = store.depth(), "Opened");
    }

    println!("{}", store.path().join(" / "));

    let current = store
        .current()
        .cloned()
        .ok_or_else(|| anyhow!("No library root"))?;
    if current.is_container() {
        print_levels(loader, current, depth).await
    } else {
        store.set_detail(current.clone());
        show_detail(loader, &current).await
    }
}

/// Print `depth` levels below `top`, loading each level concurrently
async fn print_levels(loader: &LazyLoader, top: NodeRef, depth: usize) -> Result<()> {
    let depth = depth.max(1);
    let mut level = vec![top.clone()];

    for _ in 0..depth {
        let containers: Vec<NodeRef> = level.into_iter().filter(|node| node.is_container()).collect();
        if containers.is_empty() {
            break;
        }
        try_join_all(containers.iter().map(|node| loader.load_children(node, false))).await?;
        level = containers.iter().flat_map(|node| node.children()).collect();
    }

    print_subtree(&top, 1, depth);
    Ok(())
}

fn print_subtree(node: &NodeRef, indent: usize, remaining: usize) {
    if remaining == 0 {
        return;
    }
    for child in node.children() {
        print_line(indent, &child);
        print_subtree(&child, indent + 1, remaining - 1);
    }
}

fn print_line(indent: usize, node: &NodeRef) {
    let marker = if node.is_container() { "+" } else { "-" };
    match node.subtitle() {
        Some(subtitle) => println!(
            "{:width$}{marker} {} ({subtitle}) [{}]",
            "",
            node.title(),
            node.id(),
            width = indent * 2
        ),
        None => println!("{:width$}{marker} {} [{}]", "", node.title(), node.id(), width = indent * 2),
    }
}

async fn show_detail(loader: &LazyLoader, node: &NodeRef) -> Result<()> {
    loader.enrich(node).await?;

    println!("{} [{}]", node.title(), node.kind().label());
    if let Some(subtitle) = node.subtitle() {
        println!("{subtitle}");
    }
    if let Some(overview) = node.overview() {
        println!();
        println!("{overview}");
    }
    Ok(())
}

/// Search the library and print the hits as a flat list
pub async fn search(loader: &LazyLoader, store: &mut NavigationStore, query: &str) -> Result<()> {
    let hits = loader.search(query).await?;
    store.set_search_results(hits);

    match store.search_results() {
        Some(hits) if !hits.is_empty() => {
            for hit in hits {
                print_line(0, hit);
            }
        }
        _ => println!("No results for {query}"),
    }
    Ok(())
}

/// Store the resume position of an item
pub async fn progress(loader: &LazyLoader, item_id: &str, seconds: f64) -> Result<()> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(anyhow!("Position must be a non-negative number of seconds"));
    }

    let session = loader.session();
    let raw = session
        .source()
        .fetch_detail(&ItemId::from(item_id))
        .await
        .with_context(|| format!("Failed to look up {item_id}"))?;
    let node = session.cache().node_for(raw);
    if !node.is_leaf() {
        return Err(anyhow!("{} is not playable", node.title()));
    }

    #[allow(clippy::cast_possible_truncation)]
    let ticks = (seconds * TICKS_PER_SECOND).round() as i64;
    loader.report_playback_position(&node, ticks).await?;
    println!("{}: position set to {seconds}s", node.title());
    Ok(())
}
