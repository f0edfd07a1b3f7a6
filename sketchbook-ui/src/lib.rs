//! sketchbook-ui: egui front end for canvas snapshots.
//!
//! - [`editor::SnapshotPanel`]: Save / View History buttons and the history window
//! - [`toast::Toasts`]: notification overlay implementing the notifier contract
//! - [`editor::Canvas`]: reference vector canvas implementing the editor contract
//!
//! Thumbnails are SVG bytes handed to `egui::Image`. [`install_image_loaders`]
//! registers the SVG loader; the panel calls it before drawing cards.

pub mod editor;
pub mod toast;

pub use editor::{Canvas, PanelAction, SnapshotPanel};
pub use toast::Toasts;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "sketchbook_core=info,sketchbook_snapshot=info,sketchbook_ui=info";

/// Install a fmt subscriber filtered by `RUST_LOG`. Safe to call more than once.
pub fn init_tracing() {
    let installed = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Register egui's SVG image loader. Repeat calls are no-ops.
pub fn install_image_loaders(ctx: &egui::Context) {
    egui_extras::install_image_loaders(ctx);
}

#[cfg(test)]
mod tests {
    use super::*;

    const SVG: &[u8] = br##"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4"><rect width="4" height="4" fill="#ff0000"/></svg>"##;

    #[test]
    fn test_svg_thumbnails_need_the_loader() {
        let ctx = egui::Context::default();
        ctx.include_bytes("bytes://thumb.svg", SVG);
        assert!(ctx
            .try_load_image("bytes://thumb.svg", egui::SizeHint::default())
            .is_err());

        install_image_loaders(&ctx);
        install_image_loaders(&ctx);
        assert!(ctx
            .try_load_image("bytes://thumb.svg", egui::SizeHint::default())
            .is_ok());
    }
}
