mod telemetry;

use gatherly_infra::setup_context;
use gatherly_jobs::Application;
use telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let subscriber = get_subscriber("gatherly_notify".into(), "info".into());
    init_subscriber(subscriber);

    let context = setup_context().await;

    let app = Application::new(context);
    app.run_until_stopped().await
}
