//! Toast notifications for egui hosts.

use sketchbook_core::{Notification, Notifier, Severity};
use sketchbook_snapshot::SnapshotConfig;
use std::cell::{Cell, RefCell};
use std::time::Duration;
use tracing::warn;

const DEFAULT_LIFETIME: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
struct Toast {
    id: u64,
    notification: Notification,
    /// `ctx.input().time` of the first frame that drew it.
    shown_at: Option<f64>,
}

/// Queue of on-screen notifications. Implements [`Notifier`], so it can be
/// handed straight to the snapshot panel.
#[derive(Debug)]
pub struct Toasts {
    queue: RefCell<Vec<Toast>>,
    next_id: Cell<u64>,
    lifetime: f64,
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new(DEFAULT_LIFETIME)
    }
}

impl Toasts {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            queue: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
            lifetime: lifetime.as_secs_f64(),
        }
    }

    /// Falls back to the default lifetime when `toast_seconds` is not a
    /// positive finite number.
    pub fn from_config(config: &SnapshotConfig) -> Self {
        match Duration::try_from_secs_f32(config.toast_seconds) {
            Ok(lifetime) if !lifetime.is_zero() => Self::new(lifetime),
            _ => {
                warn!(
                    "Invalid toast_seconds {}, using {}s",
                    config.toast_seconds,
                    DEFAULT_LIFETIME.as_secs()
                );
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    pub fn dismiss(&self, id: u64) {
        self.queue.borrow_mut().retain(|t| t.id != id);
    }

    /// Expire old toasts and draw the rest in the bottom-right corner.
    pub fn show(&self, ctx: &egui::Context) {
        let now = ctx.input(|i| i.time);
        let lifetime = self.lifetime;

        let visible: Vec<Toast> = {
            let mut queue = self.queue.borrow_mut();
            for toast in queue.iter_mut() {
                toast.shown_at.get_or_insert(now);
            }
            queue.retain(|t| t.shown_at.is_some_and(|at| now - at < lifetime));
            queue.clone()
        };

        if visible.is_empty() {
            return;
        }

        let next_expiry = visible
            .iter()
            .filter_map(|t| t.shown_at)
            .map(|at| (at + lifetime - now).max(0.0))
            .fold(lifetime, f64::min);
        ctx.request_repaint_after(Duration::from_secs_f64(next_expiry));

        let mut dismissed = Vec::new();
        egui::Area::new(egui::Id::new("sketchbook_toasts"))
            .anchor(egui::Align2::RIGHT_BOTTOM, [-12.0, -12.0])
            .show(ctx, |ui| {
                for toast in &visible {
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.set_max_width(320.0);
                        ui.horizontal(|ui| {
                            ui.colored_label(severity_color(toast.notification.severity), toast.notification.title.as_str());
                            if ui.small_button("✕").clicked() {
                                dismissed.push(toast.id);
                            }
                        });
                        if let Some(description) = &toast.notification.description {
                            ui.small(description.as_str());
                        }
                    });
                }
            });

        for id in dismissed {
            self.dismiss(id);
        }
    }
}

impl Notifier for Toasts {
    fn notify(&self, notification: Notification) {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.queue.borrow_mut().push(Toast {
            id,
            notification,
            shown_at: None,
        });
    }
}

fn severity_color(severity: Severity) -> egui::Color32 {
    match severity {
        Severity::Success => egui::Color32::from_rgb(156, 207, 216),
        Severity::Warning => egui::Color32::from_rgb(246, 193, 119),
        Severity::Error => egui::Color32::from_rgb(235, 111, 146),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_at(ctx: &egui::Context, toasts: &Toasts, time: f64) {
        let input = egui::RawInput {
            time: Some(time),
            ..Default::default()
        };
        let _ = ctx.run(input, |ctx| toasts.show(ctx));
    }

    #[test]
    fn test_toasts_expire_after_lifetime() {
        let toasts = Toasts::new(Duration::from_secs(5));
        let ctx = egui::Context::default();

        toasts.notify(Notification::success("Snapshot saved"));
        frame_at(&ctx, &toasts, 1.0);
        assert_eq!(toasts.len(), 1);

        // a later toast gets its own clock
        toasts.notify(Notification::warning("Canvas is empty"));
        frame_at(&ctx, &toasts, 4.0);
        assert_eq!(toasts.len(), 2);

        frame_at(&ctx, &toasts, 7.0);
        assert_eq!(toasts.len(), 1);

        frame_at(&ctx, &toasts, 9.5);
        assert!(toasts.is_empty());
    }

    #[test]
    fn test_dismiss_by_id() {
        let toasts = Toasts::default();
        toasts.notify(Notification::error("Failed to save snapshot"));
        toasts.notify(Notification::success("Snapshot loaded"));

        toasts.dismiss(0);
        assert_eq!(toasts.len(), 1);
    }

    #[test]
    fn test_lifetime_from_config() {
        let config = SnapshotConfig {
            toast_seconds: 1.5,
            ..SnapshotConfig::default()
        };
        assert_eq!(Toasts::from_config(&config).lifetime, 1.5);
    }

    #[test]
    fn test_unusable_lifetime_falls_back_to_default() {
        for seconds in [0.0, -2.0, f32::NAN, f32::INFINITY] {
            let config = SnapshotConfig {
                toast_seconds: seconds,
                ..SnapshotConfig::default()
            };
            assert_eq!(Toasts::from_config(&config).lifetime, 5.0);
        }
    }
}
