use crate::logic::{SharedState, poller_task};
use crate::model::{AppState, ContainerRecord, FetchOutcome, Settings, Target};
use eframe::egui;
use eframe::egui::{Color32, RichText};
use egui_extras::{Column, TableBuilder};
use std::sync::{Arc, Mutex};
use tr::tr;

pub struct EguiDockstat {
    pub(crate) state: SharedState,
    pub settings_open: bool,
    pub draft_servers: String,
    pub draft_refresh: u32,
}

/// Helper for application-specific colors adapted for light/dark themes.
struct StatusVisuals {
    pub is_dark: bool,
}

impl StatusVisuals {
    fn from_ctx(ctx: &egui::Context) -> Self {
        Self {
            is_dark: ctx.style().visuals.dark_mode,
        }
    }

    fn good_color(&self) -> Color32 {
        if self.is_dark {
            Color32::from_rgb(0, 255, 100)
        } else {
            Color32::from_rgb(0, 150, 0)
        }
    }

    fn bad_color(&self) -> Color32 {
        if self.is_dark {
            Color32::RED
        } else {
            Color32::from_rgb(200, 0, 0)
        }
    }

    fn warn_color(&self) -> Color32 {
        if self.is_dark {
            Color32::YELLOW
        } else {
            Color32::from_rgb(180, 140, 0)
        }
    }

    fn status_color(&self, status: &str) -> Option<Color32> {
        match status.to_ascii_lowercase().as_str() {
            "running" => Some(self.good_color()),
            "exited" | "dead" => Some(self.bad_color()),
            "paused" | "restarting" => Some(self.warn_color()),
            _ => None,
        }
    }

    fn health_color(&self, health_key: &str) -> Option<Color32> {
        match health_key.to_ascii_lowercase().as_str() {
            "healthy" => Some(self.good_color()),
            "unhealthy" => Some(self.bad_color()),
            _ => None,
        }
    }
}

impl EguiDockstat {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let state = Arc::new(Mutex::new(match cc.storage {
            Some(storage) => storage
                .get_string(eframe::APP_KEY)
                .and_then(|serialized| serde_json::from_str(&serialized).ok())
                .unwrap_or_default(),
            None => AppState::default(),
        }));

        let state_clone = state.clone();
        std::thread::spawn(move || {
            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .expect("Failed to build tokio runtime for poller")
                .block_on(poller_task(state_clone));
        });

        Self::from_state(state)
    }

    pub fn from_state(state: SharedState) -> Self {
        let (draft_servers, draft_refresh) = {
            let state_lock = state.lock().unwrap();
            (
                state_lock.settings.servers_text.clone(),
                state_lock.settings.refresh_seconds,
            )
        };

        Self {
            state,
            settings_open: false,
            draft_servers,
            draft_refresh,
        }
    }

    pub fn ui_layout(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.toolbar(ui);

                if self.settings_open {
                    self.settings_panel(ui);
                }

                ui.separator();
                self.content(ctx, ui);
            })
        });
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        let (polling, last_updated) = {
            let state_lock = self.state.lock().unwrap();
            (state_lock.polling, state_lock.last_updated)
        };

        ui.horizontal(|ui| {
            ui.heading(tr!("Docker Status"));

            if ui.button(tr!("Refresh")).clicked() {
                self.state.lock().unwrap().refresh_requested = true;
            }
            if ui.button(tr!("Settings")).clicked() {
                self.settings_open = !self.settings_open;
            }

            if polling {
                ui.spinner();
            } else if let Some(updated) = last_updated {
                ui.weak(format!(
                    "{} {}",
                    tr!("Updated"),
                    updated.format("%H:%M:%S")
                ));
            }

            // Theme switcher (right-aligned)
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let mut theme = ui.ctx().options(|o| o.theme_preference);
                let old_theme = theme;
                theme.radio_buttons(ui);
                if theme != old_theme {
                    ui.ctx().options_mut(|o| o.theme_preference = theme);
                }
            });
        });
    }

    fn settings_panel(&mut self, ui: &mut egui::Ui) {
        ui.add_space(4.0);
        ui.label(tr!("Servers (one per line, format: name|host or host)"));
        ui.add(
            egui::TextEdit::multiline(&mut self.draft_servers)
                .desired_rows(5)
                .desired_width(f32::INFINITY)
                .hint_text(tr!("web|10.0.0.5\ndb,10.0.0.6:9000\n# comment")),
        );

        ui.horizontal(|ui| {
            ui.label(tr!("Refresh (seconds):"));
            ui.add(
                egui::DragValue::new(&mut self.draft_refresh)
                    .range(Settings::MIN_REFRESH_SECONDS..=3600)
                    .suffix(" s"),
            );

            if ui.button(tr!("Save")).clicked() {
                self.draft_refresh = self.draft_refresh.max(Settings::MIN_REFRESH_SECONDS);
                let mut state_lock = self.state.lock().unwrap();
                state_lock.settings.servers_text = self.draft_servers.clone();
                state_lock.settings.refresh_seconds = self.draft_refresh;
                state_lock.refresh_requested = true;
            }
        });
        ui.add_space(4.0);
    }

    fn content(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let (targets, outcomes, configured) = {
            let state_lock = self.state.lock().unwrap();
            (
                state_lock.targets.clone(),
                state_lock.snapshot.outcomes.clone(),
                !state_lock.settings.servers_text.trim().is_empty(),
            )
        };

        if targets.is_empty() {
            ui.weak(if configured {
                tr!("Waiting for first update…")
            } else {
                tr!("No servers configured.")
            });
            return;
        }

        let visuals = StatusVisuals::from_ctx(ctx);
        for (index, target) in targets.iter().enumerate() {
            let outcome = outcomes.get(index).cloned().flatten();
            ui.push_id(index, |ui| {
                self.server_panel(ui, &visuals, target, outcome.as_ref());
            });
        }
    }

    fn server_panel(
        &self,
        ui: &mut egui::Ui,
        visuals: &StatusVisuals,
        target: &Target,
        outcome: Option<&FetchOutcome>,
    ) {
        ui.group(|ui| {
            ui.strong(&target.name);
            match outcome {
                None => {
                    ui.weak("…");
                }
                Some(FetchOutcome::Failed(message)) => {
                    ui.colored_label(visuals.bad_color(), message);
                }
                Some(FetchOutcome::Ok(value)) => match value.as_array() {
                    None => {
                        ui.weak(tr!("Unexpected response"));
                    }
                    Some(items) if items.is_empty() => {
                        ui.weak(tr!("No containers"));
                    }
                    Some(items) => {
                        let records: Vec<ContainerRecord> =
                            items.iter().map(ContainerRecord::from_value).collect();
                        container_table(ui, visuals, &records);
                    }
                },
            }
        });
    }
}

fn container_table(ui: &mut egui::Ui, visuals: &StatusVisuals, records: &[ContainerRecord]) {
    TableBuilder::new(ui)
        .striped(true)
        .columns(Column::auto().at_least(60.0), 7)
        .header(20.0, |mut header| {
            for title in [
                tr!("Name"),
                tr!("Status"),
                tr!("Uptime"),
                tr!("CPU"),
                tr!("Mem"),
                tr!("Restarts"),
                tr!("Health"),
            ] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for record in records {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(&record.name);
                    });
                    row.col(|ui| {
                        tinted_label(ui, visuals.status_color(&record.status), &record.status);
                    });
                    row.col(|ui| {
                        ui.label(&record.uptime);
                    });
                    row.col(|ui| {
                        ui.label(format!("{}%", record.cpu));
                    });
                    row.col(|ui| {
                        ui.label(format!("{} MB", record.mem));
                    });
                    row.col(|ui| {
                        ui.label(record.restarts.to_string());
                    });
                    row.col(|ui| {
                        tinted_label(ui, visuals.health_color(record.health_key()), &record.health);
                    });
                });
            }
        });
}

fn tinted_label(ui: &mut egui::Ui, color: Option<Color32>, text: &str) {
    match color {
        Some(color) => {
            ui.colored_label(color, RichText::new(text).strong());
        }
        None => {
            ui.label(text);
        }
    }
}

impl eframe::App for EguiDockstat {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        if let Ok(state_lock) = self.state.lock() {
            let serialized = serde_json::to_string(&*state_lock).unwrap_or_default();
            storage.set_string(eframe::APP_KEY, serialized);
        }
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_layout(ctx);
        ctx.request_repaint_after(std::time::Duration::from_millis(1000));
    }
}
