use crate::domain::models::{
    AppEvent, ConfigForm, ConnectionStatus, MessageSeverity, SessionCommand, StatusMessage, Tab,
};
use crate::domain::session::ConfigSession;
use crate::domain::settings::SettingsService;
use crate::infrastructure::bluetooth;
use crate::infrastructure::logging::LoggingGuard;
use eframe::egui;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, Notify};
use tracing::{error, info};

/// UI-side mirror of the session, fed by worker events
pub struct SessionView {
    pub(crate) session_tx: mpsc::UnboundedSender<SessionCommand>,
    pub(crate) event_rx: mpsc::UnboundedReceiver<AppEvent>,
    pub(crate) cancel_scan: Arc<Notify>,

    pub(crate) connection_status: ConnectionStatus,
    pub(crate) status_message: StatusMessage,
    pub(crate) form: ConfigForm,
    pub(crate) device_name: Option<String>,
    pub(crate) bluetooth_unavailable: Option<String>,
    // Set from dispatch until the worker reports WorkflowFinished
    pub(crate) busy: bool,
}

impl SessionView {
    pub fn new(
        session_tx: mpsc::UnboundedSender<SessionCommand>,
        event_rx: mpsc::UnboundedReceiver<AppEvent>,
        cancel_scan: Arc<Notify>,
    ) -> Self {
        Self {
            session_tx,
            event_rx,
            cancel_scan,
            connection_status: ConnectionStatus::Disconnected,
            status_message: StatusMessage::new("Ready.", MessageSeverity::Info),
            form: ConfigForm::default(),
            device_name: None,
            bluetooth_unavailable: None,
            busy: false,
        }
    }

    /// Drain pending worker events. Returns true if anything changed.
    pub fn poll_events(&mut self) -> bool {
        let mut changed = false;
        while let Ok(event) = self.event_rx.try_recv() {
            self.apply_event(event);
            changed = true;
        }
        changed
    }

    fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::ConnectionStatus(status) => {
                self.connection_status = status;
                if status == ConnectionStatus::Disconnected {
                    self.device_name = None;
                }
            }
            AppEvent::LogMessage(msg) => self.status_message = msg,
            AppEvent::ConfigLoaded(config) => self.form.fill_from(&config),
            AppEvent::DeviceSelected(name) => self.device_name = Some(name),
            AppEvent::BluetoothUnavailable(reason) => self.bluetooth_unavailable = Some(reason),
            AppEvent::WorkflowFinished => self.busy = false,
        }
    }

    /// Hand a command to the worker unless one is already in flight
    pub fn dispatch(&mut self, command: SessionCommand) -> bool {
        if self.busy {
            return false;
        }
        if self.session_tx.send(command).is_err() {
            error!("Session worker is not running");
            self.status_message =
                StatusMessage::new("Bluetooth worker is not running.", MessageSeverity::Error);
            return false;
        }
        self.busy = true;
        true
    }

    pub fn cancel_scan(&self) {
        self.cancel_scan.notify_waiters();
    }

    pub fn show_form(&self) -> bool {
        self.connection_status == ConnectionStatus::Connected
    }

    pub fn can_connect(&self) -> bool {
        !self.busy
            && self.bluetooth_unavailable.is_none()
            && self.connection_status == ConnectionStatus::Disconnected
    }
}

/// Start the session worker thread with its own current-thread runtime
fn spawn_session_worker(
    settings: Arc<Mutex<SettingsService>>,
    event_tx: mpsc::UnboundedSender<AppEvent>,
    cancel: Arc<Notify>,
) -> mpsc::UnboundedSender<SessionCommand> {
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();

    let spawned = std::thread::Builder::new()
        .name("ble-session".to_string())
        .spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    error!("Failed to create tokio runtime for Bluetooth: {}", e);
                    let _ = event_tx.send(AppEvent::BluetoothUnavailable(e.to_string()));
                    return;
                }
            };

            let session = ConfigSession::new(bluetooth::platform_transport(), event_tx, cancel);
            rt.block_on(session.run(cmd_rx, settings));
        });

    if let Err(e) = spawned {
        error!("Failed to spawn Bluetooth worker: {}", e);
    }

    cmd_tx
}

pub struct ConfiguratorApp {
    pub(crate) settings: Arc<Mutex<SettingsService>>,
    pub(crate) view: SessionView,

    // UI State
    pub(crate) selected_tab: Tab,
    pub(crate) is_dark_mode: bool,
    pub(crate) settings_feedback: Option<StatusMessage>,

    _logging_guard: Option<LoggingGuard>,
}

impl ConfiguratorApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        settings_service: SettingsService,
        logging_guard: Option<LoggingGuard>,
    ) -> Self {
        crate::presentation::theme::configure_style(&cc.egui_ctx, false);

        let settings = Arc::new(Mutex::new(settings_service));
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let cancel = Arc::new(Notify::new());
        let session_tx = spawn_session_worker(settings.clone(), event_tx, cancel.clone());

        info!("Session worker started");

        Self {
            settings,
            view: SessionView::new(session_tx, event_rx, cancel),
            selected_tab: Tab::Home,
            is_dark_mode: false,
            settings_feedback: None,
            _logging_guard: logging_guard,
        }
    }
}

impl eframe::App for ConfiguratorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.view.poll_events() {
            ctx.request_repaint();
        }
        // Worker events arrive off the UI thread
        ctx.request_repaint_after(Duration::from_millis(100));

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.selectable_value(&mut self.selected_tab, Tab::Home, "Home");
                ui.selectable_value(&mut self.selected_tab, Tab::Settings, "Settings");

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let switch_icon = if self.is_dark_mode {
                        "☀ Light"
                    } else {
                        "🌙 Dark"
                    };
                    if ui.button(switch_icon).clicked() {
                        self.is_dark_mode = !self.is_dark_mode;
                        crate::presentation::theme::configure_style(ctx, self.is_dark_mode);
                    }
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.set_max_width(640.0);
                    ui.add_space(20.0);

                    use crate::presentation::tabs;
                    match self.selected_tab {
                        Tab::Home => tabs::home::render(self, ui),
                        Tab::Settings => tabs::settings::render(self, ui),
                    }

                    ui.add_space(40.0);
                });
            });
        });
    }
}
