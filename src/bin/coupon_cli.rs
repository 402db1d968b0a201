use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use rand::thread_rng;
use rental_coupons::{
    commands::{
        coupons::{ApplyCouponCommand, TransferCouponCommand},
        Command,
    },
    config::{self, AppConfig},
    db::{self, DbPool},
    events::{process_events, Event, EventSender},
    services::coupons::{CouponCode, CouponService},
};
use serde::Serialize;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Generate(args) = &cli.command {
        return handle_generate(args, cli.json);
    }

    let context = CliContext::initialize().await?;

    match cli.command {
        Commands::Migrate => {
            db::run_migrations(&context.db)
                .await
                .context("failed to run migrations")?;
            println!("Migrations applied");
        }
        Commands::Validate(args) => handle_validate(&context, args, cli.json).await?,
        Commands::Transfer(args) => handle_transfer(&context, args, cli.json).await?,
        Commands::Apply(args) => handle_apply(&context, args, cli.json).await?,
        Commands::Generate(args) => handle_generate(&args, cli.json)?,
    }

    Ok(())
}

#[derive(Parser)]
#[command(name = "coupon-cli", about = "Coupon validation and discounts for rental orders", version)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON when available"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    Migrate,
    /// Print freshly generated coupon codes
    Generate(GenerateArgs),
    /// Check whether a code can be used right now
    Validate(CodeArgs),
    /// Move a coupon to an order, or release it from every order
    Transfer(TransferArgs),
    /// Validate a code, attach it to an order and add its discount lines
    Apply(ApplyArgs),
}

#[derive(Args)]
struct GenerateArgs {
    #[arg(long, default_value_t = 1)]
    count: usize,
}

#[derive(Args)]
struct CodeArgs {
    code: String,
}

#[derive(Args)]
struct TransferArgs {
    code: String,
    #[arg(long = "order", help = "Destination order id; omit to release the coupon")]
    order_id: Option<i32>,
}

#[derive(Args)]
struct ApplyArgs {
    #[arg(long = "order")]
    order_id: i32,
    code: String,
}

fn handle_generate(args: &GenerateArgs, json: bool) -> Result<()> {
    let mut rng = thread_rng();
    let codes: Vec<CouponCode> = (0..args.count)
        .map(|_| CouponCode::generate(&mut rng))
        .collect();

    if json {
        print_json(&codes)?;
    } else {
        for code in codes {
            println!("{}", code);
        }
    }
    Ok(())
}

async fn handle_validate(context: &CliContext, args: CodeArgs, json: bool) -> Result<()> {
    let service = context.coupon_service();
    match service.validate(&args.code).await {
        Ok(coupon) => {
            if json {
                print_json(&coupon)?;
            } else {
                println!(
                    "Coupon {} is usable ({:?}, {} won)",
                    coupon.code, coupon.kind, coupon.price
                );
            }
        }
        Err(err) => match err.coupon_error() {
            Some(reason) if json => print_json(&reason)?,
            Some(_) => println!("{}", err.response_message()),
            None => return Err(err).context("failed to validate coupon"),
        },
    }
    Ok(())
}

async fn handle_transfer(context: &CliContext, args: TransferArgs, json: bool) -> Result<()> {
    let command = TransferCouponCommand {
        code: args.code,
        order_id: args.order_id,
    };
    let outcome = command
        .execute(context.db.clone(), context.event_sender.clone())
        .await
        .context("failed to transfer coupon")?;

    if json {
        print_json(&outcome)?;
    } else {
        match outcome.attached_to {
            Some(order_id) => println!("Coupon {} now on order {}", outcome.coupon.code, order_id),
            None => println!("Coupon {} is {}", outcome.coupon.code, outcome.coupon.status),
        }
        if !outcome.detached.is_empty() {
            println!("Detached from orders {:?}", outcome.detached);
        }
    }
    Ok(())
}

async fn handle_apply(context: &CliContext, args: ApplyArgs, json: bool) -> Result<()> {
    let command =
        ApplyCouponCommand::new(args.order_id, args.code).with_config(context.config.coupon.clone());
    let result = command
        .execute(context.db.clone(), context.event_sender.clone())
        .await
        .context("failed to apply coupon")?;

    if json {
        print_json(&result)?;
        return Ok(());
    }

    if result.applied {
        println!("Coupon {} applied to order {}", result.coupon.code, args.order_id);
    } else {
        println!("Order {} already carries its coupon discount", args.order_id);
    }
    for detail in &result.details {
        println!(
            "- {} • {} • {}",
            detail.name,
            rental_coupons::common::commify(detail.price),
            rental_coupons::common::commify(detail.final_price)
        );
    }
    Ok(())
}

struct CliContext {
    config: AppConfig,
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl CliContext {
    async fn initialize() -> Result<Self> {
        let config = config::load_config().context("failed to load application config")?;
        config::init_tracing(config.log_level(), config.log_json);

        let db_pool = db::establish_connection_from_app_config(&config)
            .await
            .context("failed to connect to database")?;
        db::check_connection(&db_pool)
            .await
            .context("database is not reachable")?;
        let db = Arc::new(db_pool);

        let (event_tx, event_rx) = mpsc::channel::<Event>(32);
        let event_sender = Arc::new(EventSender::new(event_tx));
        tokio::spawn(process_events(event_rx));

        Ok(Self {
            config,
            db,
            event_sender,
        })
    }

    fn coupon_service(&self) -> CouponService {
        CouponService::new(self.db.clone(), self.config.coupon.clone())
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
