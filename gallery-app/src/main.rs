use std::{env, error::Error, sync::Arc, time::Duration};

use gallery_pexels::Photo;
use gallery_shard::{GalleryConfig, GalleryStore};
use gallery_ui::VirtualizationController;
use tracing::{info, warn};

const VIEWPORT_WIDTH: u32 = 1280;
const VIEWPORT_HEIGHT: f32 = 800.0;

fn init_tracing() {
    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => match tracing_subscriber::EnvFilter::try_new(
            "error,gallery_app=info,gallery_ui=info,gallery_shard=info",
        ) {
            Ok(filter) => filter,
            Err(_) => tracing_subscriber::EnvFilter::new("error"),
        },
    };

    let _ = tracing_subscriber::fmt()
        .pretty()
        .with_env_filter(filter)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
        .try_init();
}

fn report(grid: &VirtualizationController<Arc<Photo>>) {
    let dimensions = grid.dimensions();
    info!(
        "{} items in {} columns of {:.1}px, content height {}px, {} visible at scroll {}",
        grid.layout().len(),
        dimensions.column_count,
        dimensions.column_width,
        grid.content_height(),
        grid.visible_items().len(),
        grid.scroll_top()
    );
    for item in grid.visible_items().take(5) {
        info!(
            "#{} column {} at ({:.0}, {:.0}) {:.0}x{:.0} {}",
            item.index,
            item.column,
            item.left,
            item.top,
            item.width,
            item.height,
            item.item.src.optimal_for(item.width)
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let config = GalleryConfig::load()?;
    let store = GalleryStore::from_config(&config)?;
    let query = env::args().nth(1);

    store.ui.on_resize(VIEWPORT_HEIGHT);
    store.ui.on_container_width_change(VIEWPORT_WIDTH);

    store.photos.fetch_photos(true, query.as_deref()).await?;
    store.ui.with_grid(report);

    let bottom = store
        .ui
        .with_grid(|grid| (grid.total_height() - grid.viewport_height()).max(0.0));
    store.ui.on_scroll(bottom);
    while store.photos.with(|state| state.is_busy()) {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    match store.photos.with(|state| state.error_message()) {
        Some(message) => warn!("Loading more photos failed: {message}"),
        None => store.ui.with_grid(report),
    }

    store.dispose();
    Ok(())
}
