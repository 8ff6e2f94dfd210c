use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wallet_agent_api::agent::{AgentService, HttpLlmClient};
use wallet_agent_api::api::AppState;
use wallet_agent_api::auth::AuthService;
use wallet_agent_api::chain::RpcChainClient;
use wallet_agent_api::config::AppConfig;
use wallet_agent_api::create_router;
use wallet_agent_api::database::repositories::*;
use wallet_agent_api::database::{establish_connection_pool, DatabasePool};
use wallet_agent_api::notifications::{Mailer, SmtpMailer, SseHub};
use wallet_agent_api::scheduler::{CoinGeckoFeed, PriceFeed, PriceOracle, SystemClock, TriggerJob};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file (if present)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wallet_agent_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();

    // Connect to PostgreSQL - the service cannot run without its store
    let pool = match establish_connection_pool(&config.database_url, config.db_pool_size) {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to establish database connection: {}", e);
            return;
        }
    };

    // Build the mailer for the best-effort email channel
    let mailer: Arc<dyn Mailer> = match SmtpMailer::new(&config.smtp, config.frontend_url.clone()) {
        Ok(mailer) => Arc::new(mailer),
        Err(e) => {
            tracing::error!("Failed to configure SMTP mailer: {}", e);
            return;
        }
    };

    let state = build_app_state(&config, &pool);

    // Start the trigger engine before serving traffic
    initialize_trigger_job(&state, mailer).await;

    let app = create_router(state);

    let listener = match tokio::net::TcpListener::bind(&config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", config.bind_addr, e);
            return;
        }
    };

    tracing::info!("Wallet Agent API server running on http://{}", config.bind_addr);
    tracing::info!("Health check: http://{}/health", config.bind_addr);
    tracing::info!("Swagger UI: http://{}/swagger-ui", config.bind_addr);
    tracing::info!("Live events: http://{}/api/events?token=<jwt>", config.bind_addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}

/// Wire repositories, external clients and services into the shared state
fn build_app_state(config: &AppConfig, pool: &DatabasePool) -> AppState {
    let pool_clone = pool.clone();
    let users = Arc::new(UserRepositoryImpl::new(move || pool_clone.get_conn())) as Arc<dyn UserRepository>;

    let pool_clone = pool.clone();
    let contacts =
        Arc::new(ContactRepositoryImpl::new(move || pool_clone.get_conn())) as Arc<dyn ContactRepository>;

    let pool_clone = pool.clone();
    let transactions = Arc::new(TransactionRepositoryImpl::new(move || pool_clone.get_conn()))
        as Arc<dyn TransactionRepository>;

    let pool_clone = pool.clone();
    let stakes =
        Arc::new(StakeRepositoryImpl::new(move || pool_clone.get_conn())) as Arc<dyn StakeRepository>;

    let pool_clone = pool.clone();
    let tasks =
        Arc::new(TaskRepositoryImpl::new(move || pool_clone.get_conn())) as Arc<dyn TaskRepository>;

    let pool_clone = pool.clone();
    let chats =
        Arc::new(ChatRepositoryImpl::new(move || pool_clone.get_conn())) as Arc<dyn ChatRepository>;

    let llm = Arc::new(HttpLlmClient::new(
        config.llm_api_url.clone(),
        config.llm_api_key.clone(),
        config.llm_model.clone(),
    ));
    let agent = Arc::new(AgentService::new(llm, chats));

    AppState {
        auth: AuthService::new(config.jwt_secret.clone()),
        users,
        contacts,
        transactions,
        stakes,
        tasks,
        chain: Arc::new(RpcChainClient::new(config.chain_rpc_url.clone())),
        agent,
        hub: Arc::new(SseHub::new()),
    }
}

/// Register the trigger job on its interval and fire the boot-time tick
async fn initialize_trigger_job(state: &AppState, mailer: Arc<dyn Mailer>) {
    use tokio_cron_scheduler::JobScheduler;

    tracing::info!("Initializing trigger engine...");

    let scheduler = match JobScheduler::new().await {
        Ok(scheduler) => scheduler,
        Err(e) => {
            tracing::error!("Failed to create job scheduler: {}", e);
            return;
        }
    };

    let oracle = Arc::new(PriceOracle::new(
        Arc::new(CoinGeckoFeed::new()) as Arc<dyn PriceFeed>
    ));

    let job = Arc::new(TriggerJob::new(
        Arc::clone(&state.tasks),
        oracle,
        Arc::clone(&state.hub),
        mailer,
        Arc::new(SystemClock),
    ));

    if let Err(e) = Arc::clone(&job).register(&scheduler).await {
        tracing::error!("Failed to register trigger job: {}", e);
        return;
    }

    if let Err(e) = scheduler.start().await {
        tracing::error!("Failed to start job scheduler: {}", e);
        return;
    }

    // One immediate pass so a restart doesn't wait out the first interval
    tokio::spawn(async move {
        job.run_now().await;
    });

    tracing::info!("Trigger engine started (evaluates every minute)");

    // The scheduler runs in the background for the life of the process
    std::mem::forget(scheduler);
}
