use std::env;
use std::fmt::Display;
use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use ceport_client::configs::Settings;
use ceport_client::monitor::*;
use ceport_client::{Client, Notification, Prompt, SensorBackend, Session};

struct Terminal {
    lines: Lines<BufReader<Stdin>>,
}

impl Terminal {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    async fn ask(&mut self, question: &str) -> Option<String> {
        print!("{question}");
        let _ = std::io::stdout().flush();

        self.lines.next_line().await.ok().flatten()
    }
}

#[async_trait]
impl Prompt for Terminal {
    async fn confirm(&mut self, title: &str, message: &str) -> bool {
        let answer = self.ask(&format!("{title}: {message} [y/N] ")).await;

        matches!(answer, Some(answer) if answer.trim().eq_ignore_ascii_case("y"))
    }
}

fn label<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |value| value.to_string())
}

fn render_dashboard(view: &ScreenState<DashboardSnapshot>) {
    let snapshot = &view.snapshot;

    println!(
        "[dashboard] temperature {} | humidity {} | air quality {} | noise {} | transit {} | spots {} / {} | updated {}",
        snapshot.temperature,
        snapshot.humidity,
        label(snapshot.air_quality),
        label(snapshot.noise),
        label(snapshot.transit),
        label(snapshot.spots[0]),
        label(snapshot.spots[1]),
        label(view.elapsed_label()),
    );

    if let Some(error) = &view.error {
        println!("[dashboard] {error}");
    }
}

fn render_parking(view: &ScreenState<ParkingSnapshot>) {
    for spot in Spot::ALL {
        let indicator = view.snapshot.spot(spot);
        println!("[parking] spot {} {} ({})", spot, indicator, indicator.color());
    }

    if let Some(error) = &view.error {
        println!("[parking] {error}");
    }
}

fn notify(notification: &Notification) {
    println!("{}: {}", notification.title, notification.message);
}

async fn login(backend: &Arc<dyn SensorBackend>, terminal: &mut Terminal) -> Option<Session> {
    let from_env = (env::var("CEPORT_EMAIL").ok(), env::var("CEPORT_PASSWORD").ok());

    if let (Some(email), Some(password)) = from_env {
        return match Session::login(Arc::clone(backend), &email, &password).await {
            Ok(session) => Some(session),
            Err(e) => {
                println!("Login: {e}");
                None
            }
        };
    }

    loop {
        let email = terminal.ask("Email: ").await?;
        let password = terminal.ask("Password: ").await?;

        match Session::login(Arc::clone(backend), email.trim(), password.trim()).await {
            Ok(session) => return Some(session),
            Err(e) => println!("Login: {e}"),
        }
    }
}

async fn diagnostics(backend: &Arc<dyn SensorBackend>, command: &str) {
    match command {
        "users" => match backend.list_users().await {
            Ok(users) => {
                for user in users {
                    println!("{} {}", user.email, user.name.unwrap_or_default());
                }
            }
            Err(e) => println!("Error: {e}"),
        },
        "history" => match backend.list_sensor_readings().await {
            Ok(readings) => {
                println!("{} readings", readings.len());
                for reading in readings.iter().rev().take(5) {
                    println!(
                        "{} gas {} noise {} ult {} / {}",
                        label(reading.timestamp.as_deref()),
                        label(reading.gas01),
                        label(reading.son01),
                        label(reading.ult01),
                        label(reading.ult02),
                    );
                }
            }
            Err(e) => println!("Error: {e}"),
        },
        "statuses" => match backend.list_sensor_statuses().await {
            Ok(statuses) => {
                for status in statuses {
                    let state = if status.is_active { "active" } else { "inactive" };
                    println!("{} {}", status.name, state);
                }
            }
            Err(e) => println!("Error: {e}"),
        },
        _ => println!("commands: 0 | 1 | r | s | users | history | statuses | q"),
    }
}

#[tokio::main]
async fn main() {
    let settings = Settings::new().expect("Failed to load settings.");

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let app_name = env!("CARGO_PKG_NAME").replace('-', "_");
            let level = settings.logger.level.as_str();

            format!("{app_name}={level}").into()
        }))
        .init();

    let client = Client::new(&settings.backend).expect("Failed to create HTTP client.");
    let backend: Arc<dyn SensorBackend> = Arc::new(client);
    let mut terminal = Terminal::new();

    let Some(session) = login(&backend, &mut terminal).await else {
        return;
    };

    println!("{}", session.greeting());

    let dashboard = session.dashboard(&settings.polling);
    let parking = session.parking(&settings.polling);
    let mut dashboard_rx = dashboard.subscribe();
    let mut parking_rx = parking.subscribe();
    let mut shown = (dashboard.current(), parking.current());

    loop {
        tokio::select! {
            Ok(()) = dashboard_rx.changed() => {
                let view = dashboard_rx.borrow_and_update().clone();
                if view.state != shown.0.state || view.snapshot != shown.0.snapshot {
                    render_dashboard(&view);
                }
                shown.0 = view;
            }
            Ok(()) = parking_rx.changed() => {
                let view = parking_rx.borrow_and_update().clone();
                if view.state != shown.1.state || view.snapshot != shown.1.snapshot {
                    render_parking(&view);
                }
                shown.1 = view;
            }
            line = terminal.lines.next_line() => {
                let Ok(Some(line)) = line else { break };

                match line.trim() {
                    "q" => break,
                    "r" => {
                        dashboard.refresh();
                        parking.refresh();
                    }
                    "s" => {
                        render_dashboard(&dashboard.current());
                        render_parking(&parking.current());
                    }
                    command => match command.parse::<usize>().ok().and_then(Spot::from_index) {
                        Some(spot) => {
                            if let Some(notification) = session.toggle_spot(spot, &mut terminal, &parking).await {
                                notify(&notification);
                            }
                        }
                        None => diagnostics(session.backend(), command).await,
                    },
                }
            }
        }
    }

    dashboard.stop();
    parking.stop();
}
