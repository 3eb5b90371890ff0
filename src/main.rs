use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::{warn, Level};

use fareflow::api::{AggregateKind, ApiClient, CategoryKind};
use fareflow::charges::{
    export_csv, ChargeField, ChargeFilters, ChargesTable, SaveReport, SortDir,
};
use fareflow::config::{
    clear_session, config_dir, load_config, load_session, save_session, Config, CONFIG_TEMPLATE,
};
use fareflow::error::{FareflowError, Result};
use fareflow::models::{
    deletion_refused, AccountCharge, CategoryInput, DriverInput, EntityType, ExpenseKind,
    Frequency, LoginRequest, OneTimeExpenseInput, RecurringExpenseInput,
};
use fareflow::report::{CumulativeTotals, DriverSummaryReport, ReportQuery};

#[derive(Parser)]
#[command(name = "fareflow")]
#[command(version, about = "Fleet back-office CLI for the FareFlow API", long_about = None)]
struct Cli {
    /// Path to config directory (default: XDG config dir or ~/.fareflow)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a template config.toml
    Init,

    /// Show configuration and login status
    Status,

    /// Log in and store the session
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the logged-in user as the server sees it
    Whoami,

    /// Account charges
    #[command(subcommand)]
    Charges(ChargeCommands),

    /// Driver records
    #[command(subcommand)]
    Drivers(DriverCommands),

    /// Recurring and one-time expenses
    #[command(subcommand)]
    Expenses(ExpenseCommands),

    /// Expense and revenue categories
    #[command(subcommand)]
    Categories(CategoryCommands),

    /// Financial reports
    #[command(subcommand)]
    Reports(ReportCommands),
}

#[derive(Args, Clone, Default)]
struct ChargeFilterArgs {
    /// Customer name contains
    #[arg(long)]
    customer: Option<String>,

    #[arg(long)]
    cab: Option<i64>,

    #[arg(long)]
    driver: Option<i64>,

    /// Trips on or after this date (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Trips on or before this date (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Only paid (true) or unpaid (false) charges
    #[arg(long)]
    paid: Option<bool>,
}

impl From<ChargeFilterArgs> for ChargeFilters {
    fn from(args: ChargeFilterArgs) -> Self {
        ChargeFilters {
            customer_name: args.customer,
            cab_id: args.cab,
            driver_id: args.driver,
            start_date: args.from,
            end_date: args.to,
            paid: args.paid,
        }
    }
}

#[derive(Args, Clone)]
struct PagingArgs {
    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Rows per page
    #[arg(long, default_value_t = 25)]
    size: usize,

    #[arg(long, default_value = "tripDate")]
    sort_by: String,

    /// asc or desc
    #[arg(long, default_value = "desc")]
    sort_dir: SortDir,
}

#[derive(Subcommand)]
enum ChargeCommands {
    /// List charges
    List {
        #[command(flatten)]
        filters: ChargeFilterArgs,

        #[command(flatten)]
        paging: PagingArgs,

        /// Also write the page to a CSV file
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,
    },

    /// Edit several rows of one page and save them together
    BulkEdit {
        #[command(flatten)]
        filters: ChargeFilterArgs,

        #[command(flatten)]
        paging: PagingArgs,

        /// Cell edit "row:field=value", row as shown by 'charges list' (repeatable)
        #[arg(short, long = "set", value_name = "ROW:FIELD=VALUE", required = true)]
        set: Vec<String>,

        /// Show the update bodies without sending them
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Args, Clone)]
struct DriverArgs {
    #[arg(long)]
    first_name: Option<String>,

    #[arg(long)]
    last_name: Option<String>,

    #[arg(long)]
    email: Option<String>,

    #[arg(long)]
    phone: Option<String>,

    #[arg(long)]
    license: Option<String>,

    /// License expiry date (YYYY-MM-DD)
    #[arg(long)]
    license_expiry: Option<NaiveDate>,

    /// Driver also owns a cab
    #[arg(long)]
    owner: Option<bool>,
}

#[derive(Subcommand)]
enum DriverCommands {
    /// List drivers
    List,

    /// Show one driver
    Show { id: i64 },

    /// Register a driver
    Add {
        #[command(flatten)]
        fields: DriverArgs,
    },

    /// Change a driver's details (only given fields change)
    Update {
        id: i64,

        #[command(flatten)]
        fields: DriverArgs,
    },

    /// Suspend a driver
    Suspend { id: i64 },

    /// Re-activate a suspended driver
    Activate { id: i64 },
}

#[derive(Subcommand)]
enum ExpenseCommands {
    /// Fixed-cadence expenses
    #[command(subcommand)]
    Recurring(RecurringCommands),

    /// Dated variable expenses
    #[command(subcommand)]
    OneTime(OneTimeCommands),
}

#[derive(Subcommand)]
enum RecurringCommands {
    List,

    Add {
        /// Expense category id
        #[arg(long)]
        category: i64,

        /// cab, shift, driver, owner or company
        #[arg(long)]
        entity_type: EntityType,

        #[arg(long)]
        entity_id: Option<i64>,

        #[arg(long)]
        amount: Decimal,

        /// daily, weekly, monthly or yearly
        #[arg(long, default_value = "monthly")]
        frequency: Frequency,

        /// Effective from (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,

        /// Effective until (YYYY-MM-DD), open-ended if omitted
        #[arg(long)]
        to: Option<NaiveDate>,

        #[arg(long)]
        description: Option<String>,
    },

    Deactivate { id: i64 },

    Reactivate { id: i64 },

    /// Not allowed: recurring expenses are deactivated, never deleted
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum OneTimeCommands {
    List {
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,

        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,
    },

    Add {
        #[arg(long)]
        category: i64,

        #[arg(long)]
        entity_type: EntityType,

        #[arg(long)]
        entity_id: Option<i64>,

        #[arg(long)]
        amount: Decimal,

        /// Expense date (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        vendor: Option<String>,
    },

    /// Post an offsetting entry that cancels an expense
    Reverse {
        id: i64,

        /// Date of the reversal (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Not allowed: one-time expenses are corrected by reversal
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum CategoryCommands {
    #[command(subcommand)]
    Expense(CategoryAction),

    #[command(subcommand)]
    Revenue(CategoryAction),
}

#[derive(Subcommand, Clone)]
enum CategoryAction {
    List,

    Add {
        name: String,

        #[arg(long)]
        description: Option<String>,

        /// Entity type the category applies to
        #[arg(long)]
        applies_to: Option<EntityType>,
    },

    Rename { id: i64, name: String },
}

#[derive(Args, Clone)]
struct DateRangeArgs {
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    from: NaiveDate,

    /// End date (YYYY-MM-DD)
    #[arg(long)]
    to: NaiveDate,
}

#[derive(Subcommand)]
enum ReportCommands {
    /// Per-driver revenue, expenses and amount owed
    DriverSummary {
        #[command(flatten)]
        range: DateRangeArgs,

        /// Drivers per page (default: reports.page_size from config)
        #[arg(long)]
        page_size: Option<usize>,

        #[arg(long, default_value = "driverName")]
        sort: String,

        #[arg(long, default_value = "asc")]
        direction: SortDir,

        /// Walk this many pages from the first
        #[arg(long, default_value_t = 1, conflicts_with = "last")]
        pages: usize,

        /// Jump to the last page and show grand totals
        #[arg(long)]
        last: bool,
    },

    LeaseRevenue {
        #[command(flatten)]
        range: DateRangeArgs,
    },

    CreditCardRevenue {
        #[command(flatten)]
        range: DateRangeArgs,
    },

    ChargesRevenue {
        #[command(flatten)]
        range: DateRangeArgs,
    },

    FixedExpenses {
        #[command(flatten)]
        range: DateRangeArgs,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg_dir = match cli.config_dir.clone() {
        Some(p) => p,
        None => match config_dir() {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
    };

    if let Err(e) = run(cli.command, &cfg_dir) {
        // A rejected or expired token is useless; force a fresh login
        if matches!(e, FareflowError::Unauthorized | FareflowError::SessionExpired) {
            if let Err(clear_err) = clear_session(&cfg_dir) {
                warn!(error = %clear_err, "could not remove stale session.toml");
            }
        }
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands, cfg_dir: &Path) -> Result<()> {
    match command {
        Commands::Init => cmd_init(cfg_dir),
        Commands::Status => cmd_status(cfg_dir),
        Commands::Login { email, password } => cmd_login(cfg_dir, email, password),
        Commands::Logout => cmd_logout(cfg_dir),
        Commands::Whoami => cmd_whoami(cfg_dir),
        Commands::Charges(cmd) => cmd_charges(cfg_dir, cmd),
        Commands::Drivers(cmd) => cmd_drivers(cfg_dir, cmd),
        Commands::Expenses(cmd) => cmd_expenses(cfg_dir, cmd),
        Commands::Categories(cmd) => cmd_categories(cfg_dir, cmd),
        Commands::Reports(cmd) => cmd_reports(cfg_dir, cmd),
    }
}

/// Loaded config plus a client carrying the stored session
struct App {
    config: Config,
    client: ApiClient,
}

fn open_app(cfg_dir: &Path) -> Result<App> {
    let config = load_config(cfg_dir)?;
    let session = load_session(cfg_dir)?;
    let client = ApiClient::new(&config.api, session);
    Ok(App { config, client })
}

/// Like `open_app`, but fails early when nobody is logged in
fn open_session(cfg_dir: &Path) -> Result<App> {
    let app = open_app(cfg_dir)?;
    if app.client.session().is_none() {
        return Err(FareflowError::NotLoggedIn);
    }
    Ok(app)
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(FareflowError::AlreadyInitialized(cfg_dir.to_path_buf()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;

    println!("Initialized fareflow config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Point it at your API:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!("  2. Log in:                fareflow login --email <email> --password <password>");

    Ok(())
}

fn cmd_status(cfg_dir: &Path) -> Result<()> {
    let config = load_config(cfg_dir)?;
    let session = load_session(cfg_dir)?;

    println!("FareFlow Status");
    println!("{}", "-".repeat(50));
    println!("Config directory: {}", cfg_dir.display());
    println!("API:              {}", config.api.base_url);
    println!("Report page size: {}", config.reports.page_size);
    println!("Bulk concurrency: {}", config.bulk_edit.concurrency);

    match session {
        Some(s) => {
            let state = if s.is_expired() { "expired" } else { "active" };
            println!("Logged in as:     {} ({state})", s.user.email);
            println!("Tenant:           {}", s.tenant_label());
            if let Some(id) = s.company_id {
                println!("Company id:       {id}");
            }
        }
        None => println!("Logged in as:     (not logged in)"),
    }

    Ok(())
}

fn cmd_login(cfg_dir: &Path, email: String, password: String) -> Result<()> {
    let mut app = open_app(cfg_dir)?;
    let session = app.client.login(&LoginRequest { email, password })?;
    save_session(cfg_dir, &session)?;

    println!("Logged in as {}", session.user.email);
    println!("  Tenant: {}", session.tenant_label());
    Ok(())
}

fn cmd_logout(cfg_dir: &Path) -> Result<()> {
    if clear_session(cfg_dir)? {
        println!("Logged out.");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}

fn cmd_whoami(cfg_dir: &Path) -> Result<()> {
    let app = open_session(cfg_dir)?;
    let user = app.client.me()?;
    println!("{} (id {})", user.email, user.id);
    if let Some(name) = &user.name {
        println!("  Name:   {name}");
    }
    if let Some(role) = &user.role {
        println!("  Role:   {role}");
    }
    if let Some(session) = app.client.session() {
        println!("  Tenant: {}", session.tenant_label());
    }
    Ok(())
}

// Table row structs for tabled
#[derive(Tabled)]
struct ChargeRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "JOB")]
    job: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "CUSTOMER")]
    customer: String,
    #[tabled(rename = "PASSENGER")]
    passenger: String,
    #[tabled(rename = "DRIVER")]
    driver: String,
    #[tabled(rename = "FARE")]
    fare: String,
    #[tabled(rename = "TIP")]
    tip: String,
    #[tabled(rename = "PAID")]
    paid: String,
    #[tabled(rename = "INVOICE")]
    invoice: String,
}

#[derive(Tabled)]
struct DriverRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "EMAIL")]
    email: String,
    #[tabled(rename = "LICENSE")]
    license: String,
    #[tabled(rename = "OWNER")]
    owner: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

#[derive(Tabled)]
struct RecurringRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "CATEGORY")]
    category: String,
    #[tabled(rename = "APPLIES TO")]
    entity: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
    #[tabled(rename = "EVERY")]
    frequency: String,
    #[tabled(rename = "FROM")]
    from: String,
    #[tabled(rename = "TO")]
    to: String,
    #[tabled(rename = "ACTIVE")]
    active: String,
}

#[derive(Tabled)]
struct OneTimeRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "CATEGORY")]
    category: String,
    #[tabled(rename = "APPLIES TO")]
    entity: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
}

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "APPLIES TO")]
    applies_to: String,
    #[tabled(rename = "ACTIVE")]
    active: String,
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "DRIVER")]
    driver: String,
    #[tabled(rename = "LEASE")]
    lease: String,
    #[tabled(rename = "CARD")]
    card: String,
    #[tabled(rename = "CHARGES")]
    charges: String,
    #[tabled(rename = "EXPENSES")]
    expenses: String,
    #[tabled(rename = "PAID")]
    paid: String,
    #[tabled(rename = "NET OWED")]
    net_owed: String,
}

#[derive(Tabled)]
struct AggregateRow {
    #[tabled(rename = "ITEM")]
    label: String,
    #[tabled(rename = "COUNT")]
    count: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
}

fn format_grouped_int(value: i64) -> String {
    let negative = value < 0;
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    let mut grouped: String = out.chars().rev().collect();
    if negative {
        grouped.insert(0, '-');
    }
    grouped
}

/// Format a money amount with two decimal places and thousands separators
fn format_money(value: Decimal, currency_symbol: &str) -> String {
    let rounded = format!("{:.2}", value.abs());
    let (whole, frac) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));
    let grouped = format_grouped_int(whole.parse::<i64>().unwrap_or(0));
    let sign = if value.is_sign_negative() && !value.is_zero() { "-" } else { "" };
    format!("{sign}{currency_symbol}{grouped}.{frac}")
}

fn print_table<T: Tabled>(rows: Vec<T>) {
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
}

fn charge_rows(charges: &[AccountCharge], symbol: &str) -> Vec<ChargeRow> {
    charges
        .iter()
        .enumerate()
        .map(|(idx, c)| ChargeRow {
            index: idx + 1,
            id: c.id,
            job: c.job_code.clone().unwrap_or_default(),
            date: c.trip_date.map(|d| d.to_string()).unwrap_or_default(),
            customer: c
                .customer
                .as_ref()
                .and_then(|r| r.name.clone())
                .unwrap_or_default(),
            passenger: c.passenger_name.clone().unwrap_or_default(),
            driver: c
                .driver
                .as_ref()
                .map(|d| d.display_name())
                .unwrap_or_default(),
            fare: format_money(c.fare_amount, symbol),
            tip: format_money(c.tip_amount, symbol),
            paid: if c.paid { "yes" } else { "no" }.to_string(),
            invoice: c.invoice_number.clone().unwrap_or_default(),
        })
        .collect()
}

/// Build the table and load the requested page (1-based)
fn load_charges_table(
    client: &ApiClient,
    filters: ChargeFilterArgs,
    paging: &PagingArgs,
) -> Result<ChargesTable> {
    if paging.page == 0 {
        return Err(FareflowError::Validation("pages start at 1".to_string()));
    }
    let mut table = ChargesTable::new(paging.size);
    *table.filters.draft_mut() = filters.into();
    table.filters.apply();
    table.sort(client, &paging.sort_by, paging.sort_dir)?;
    if paging.page > 1 {
        table.goto(client, paging.page - 1)?;
    }
    Ok(table)
}

fn cmd_charges(cfg_dir: &Path, cmd: ChargeCommands) -> Result<()> {
    let app = open_session(cfg_dir)?;
    let symbol = app.config.display.currency_symbol.clone();

    match cmd {
        ChargeCommands::List {
            filters,
            paging,
            csv,
        } => {
            let table = load_charges_table(&app.client, filters, &paging)?;
            let charges = table.charges();

            if charges.is_empty() {
                println!("No charges found.");
            } else {
                print_table(charge_rows(charges, &symbol));
            }

            if let Some(page) = table.current() {
                let total: Decimal = charges.iter().map(|c| c.total()).sum();
                println!();
                println!(
                    "Page {} of {} ({} charges), page total {}",
                    page.number + 1,
                    page.total_pages.max(1),
                    page.total_elements,
                    format_money(total, &symbol)
                );
            }

            if let Some(path) = csv {
                let file = std::fs::File::create(&path)?;
                export_csv(charges, file)?;
                println!("Exported {} charges to {}", charges.len(), path.display());
            }
            Ok(())
        }
        ChargeCommands::BulkEdit {
            filters,
            paging,
            set,
            dry_run,
        } => {
            let mut table = load_charges_table(&app.client, filters, &paging)?;
            table.begin_bulk_edit()?;
            for edit in &set {
                let (row, field, value) = parse_cell_edit(edit)?;
                table.change(row, field, value)?;
            }

            if dry_run {
                let payloads = table.editor().payloads()?;
                let edited: Vec<_> = table
                    .editor()
                    .rows()
                    .iter()
                    .zip(payloads.iter())
                    .filter(|(row, _)| row.is_edited())
                    .map(|(_, p)| p)
                    .collect();
                let json = serde_json::to_string_pretty(&edited)
                    .map_err(|e| FareflowError::Validation(e.to_string()))?;
                println!("{json}");
                println!(
                    "Dry run: {} row(s) on this page would be submitted.",
                    payloads.len()
                );
                return Ok(());
            }

            let report = table.save_bulk(&app.client, app.config.bulk_edit.concurrency)?;
            print_save_report(&report);
            if report.is_success() {
                print_table(charge_rows(table.charges(), &symbol));
                Ok(())
            } else {
                Err(FareflowError::PartialFailure {
                    failed: report.failures.len(),
                    submitted: report.submitted,
                })
            }
        }
    }
}

/// Parse "row:field=value" with a 1-based row
fn parse_cell_edit(edit: &str) -> Result<(usize, ChargeField, String)> {
    let invalid = || {
        FareflowError::Validation(format!(
            "invalid edit '{edit}'. Expected 'row:field=value' (e.g., '2:fare_amount=75.50')"
        ))
    };
    let (row, rest) = edit.split_once(':').ok_or_else(invalid)?;
    let (field, value) = rest.split_once('=').ok_or_else(invalid)?;
    let row: usize = row.trim().parse().map_err(|_| invalid())?;
    if row == 0 {
        return Err(invalid());
    }
    let field: ChargeField = field.trim().parse()?;
    Ok((row - 1, field, value.to_string()))
}

fn print_save_report(report: &SaveReport) {
    println!("Updated {} of {} charges", report.updated, report.submitted);
    for failure in &report.failures {
        println!(
            "  row {} (charge {}): {}",
            failure.row + 1,
            failure.charge_id,
            failure.reason
        );
    }
}

fn driver_input(fields: DriverArgs, base: DriverInput) -> DriverInput {
    DriverInput {
        first_name: fields.first_name.unwrap_or(base.first_name),
        last_name: fields.last_name.unwrap_or(base.last_name),
        email: fields.email.or(base.email),
        phone: fields.phone.or(base.phone),
        license_number: fields.license.or(base.license_number),
        license_expiry: fields.license_expiry.or(base.license_expiry),
        is_owner: fields.owner.unwrap_or(base.is_owner),
    }
}

fn cmd_drivers(cfg_dir: &Path, cmd: DriverCommands) -> Result<()> {
    let app = open_session(cfg_dir)?;
    let client = &app.client;

    match cmd {
        DriverCommands::List => {
            let drivers = client.list_drivers()?;
            if drivers.is_empty() {
                println!("No drivers registered.");
                return Ok(());
            }
            let rows: Vec<DriverRow> = drivers
                .iter()
                .map(|d| DriverRow {
                    id: d.id,
                    name: d.full_name(),
                    email: d.email.clone().unwrap_or_default(),
                    license: d.license_number.clone().unwrap_or_default(),
                    owner: if d.is_owner { "yes" } else { "" }.to_string(),
                    status: d.status.to_string(),
                })
                .collect();
            print_table(rows);
        }
        DriverCommands::Show { id } => {
            let d = client.get_driver(id)?;
            println!("Driver #{}: {}", d.id, d.full_name());
            println!("  Status:  {}", d.status);
            println!("  Email:   {}", d.email.as_deref().unwrap_or("-"));
            println!("  Phone:   {}", d.phone.as_deref().unwrap_or("-"));
            println!("  License: {}", d.license_number.as_deref().unwrap_or("-"));
            if let Some(exp) = d.license_expiry {
                println!("  Expires: {exp}");
            }
            println!("  Owner:   {}", if d.is_owner { "yes" } else { "no" });
        }
        DriverCommands::Add { fields } => {
            let input = driver_input(fields, DriverInput::default());
            let d = client.create_driver(&input)?;
            println!("Added driver #{} {}", d.id, d.full_name());
        }
        DriverCommands::Update { id, fields } => {
            let current = client.get_driver(id)?;
            let input = driver_input(fields, DriverInput::from(&current));
            let d = client.update_driver(id, &input)?;
            println!("Updated driver #{} {}", d.id, d.full_name());
        }
        DriverCommands::Suspend { id } => {
            client.suspend_driver(id)?;
            println!("Suspended driver #{id}");
        }
        DriverCommands::Activate { id } => {
            client.activate_driver(id)?;
            println!("Activated driver #{id}");
        }
    }
    Ok(())
}

fn entity_label(entity_type: EntityType, entity_id: Option<i64>) -> String {
    match entity_id {
        Some(id) => format!("{entity_type} #{id}"),
        None => entity_type.to_string(),
    }
}

fn cmd_expenses(cfg_dir: &Path, cmd: ExpenseCommands) -> Result<()> {
    // Deletion is refused by policy before anything else is loaded
    match &cmd {
        ExpenseCommands::Recurring(RecurringCommands::Delete { .. }) => {
            return Err(deletion_refused(ExpenseKind::Recurring));
        }
        ExpenseCommands::OneTime(OneTimeCommands::Delete { .. }) => {
            return Err(deletion_refused(ExpenseKind::OneTime));
        }
        _ => {}
    }

    let app = open_session(cfg_dir)?;
    let client = &app.client;
    let symbol = app.config.display.currency_symbol.as_str();

    match cmd {
        ExpenseCommands::Recurring(cmd) => match cmd {
            RecurringCommands::List => {
                let expenses = client.list_recurring_expenses()?;
                if expenses.is_empty() {
                    println!("No recurring expenses.");
                    return Ok(());
                }
                let rows: Vec<RecurringRow> = expenses
                    .iter()
                    .map(|e| RecurringRow {
                        id: e.id,
                        category: e
                            .category
                            .as_ref()
                            .and_then(|c| c.name.clone())
                            .unwrap_or_default(),
                        entity: entity_label(e.entity_type, e.entity_id),
                        amount: format_money(e.amount, symbol),
                        frequency: e.frequency.to_string(),
                        from: e.effective_from.to_string(),
                        to: e.effective_to.map(|d| d.to_string()).unwrap_or_default(),
                        active: if e.active { "yes" } else { "no" }.to_string(),
                    })
                    .collect();
                print_table(rows);
            }
            RecurringCommands::Add {
                category,
                entity_type,
                entity_id,
                amount,
                frequency,
                from,
                to,
                description,
            } => {
                let created = client.create_recurring_expense(&RecurringExpenseInput {
                    expense_category_id: category,
                    entity_type,
                    entity_id,
                    amount,
                    frequency,
                    effective_from: from,
                    effective_to: to,
                    description,
                })?;
                println!(
                    "Added recurring expense #{} ({} {})",
                    created.id,
                    format_money(created.amount, symbol),
                    created.frequency
                );
            }
            RecurringCommands::Deactivate { id } => {
                client.deactivate_recurring_expense(id)?;
                println!("Deactivated recurring expense #{id}");
            }
            RecurringCommands::Reactivate { id } => {
                client.reactivate_recurring_expense(id)?;
                println!("Reactivated recurring expense #{id}");
            }
            RecurringCommands::Delete { .. } => return Err(deletion_refused(ExpenseKind::Recurring)),
        },
        ExpenseCommands::OneTime(cmd) => match cmd {
            OneTimeCommands::List { from, to } => {
                let expenses = match (from, to) {
                    (Some(from), Some(to)) => client.one_time_expenses_between(from, to)?,
                    _ => client.list_one_time_expenses()?,
                };
                if expenses.is_empty() {
                    println!("No one-time expenses.");
                    return Ok(());
                }
                let total: Decimal = expenses.iter().map(|e| e.amount).sum();
                let rows: Vec<OneTimeRow> = expenses
                    .iter()
                    .map(|e| OneTimeRow {
                        id: e.id,
                        date: e.expense_date.to_string(),
                        category: e
                            .category
                            .as_ref()
                            .and_then(|c| c.name.clone())
                            .unwrap_or_default(),
                        entity: entity_label(e.entity_type, e.entity_id),
                        amount: format_money(e.amount, symbol),
                        description: match e.reverses_expense_id {
                            Some(orig) => format!("reversal of #{orig}"),
                            None => e.description.clone().unwrap_or_default(),
                        },
                    })
                    .collect();
                print_table(rows);
                println!();
                println!("Net total: {}", format_money(total, symbol));
            }
            OneTimeCommands::Add {
                category,
                entity_type,
                entity_id,
                amount,
                date,
                description,
                vendor,
            } => {
                let created = client.create_one_time_expense(&OneTimeExpenseInput {
                    expense_category_id: category,
                    entity_type,
                    entity_id,
                    amount,
                    expense_date: date.unwrap_or_else(today),
                    description,
                    vendor,
                    reverses_expense_id: None,
                })?;
                println!(
                    "Added one-time expense #{} ({} on {})",
                    created.id,
                    format_money(created.amount, symbol),
                    created.expense_date
                );
            }
            OneTimeCommands::Reverse { id, date } => {
                let reversal = client.reverse_one_time_expense(id, date.unwrap_or_else(today))?;
                println!(
                    "Reversed expense #{id} with entry #{} ({})",
                    reversal.id,
                    format_money(reversal.amount, symbol)
                );
            }
            OneTimeCommands::Delete { .. } => return Err(deletion_refused(ExpenseKind::OneTime)),
        },
    }
    Ok(())
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn cmd_categories(cfg_dir: &Path, cmd: CategoryCommands) -> Result<()> {
    let (kind, action) = match cmd {
        CategoryCommands::Expense(action) => (CategoryKind::Expense, action),
        CategoryCommands::Revenue(action) => (CategoryKind::Revenue, action),
    };
    let app = open_session(cfg_dir)?;
    let client = &app.client;

    match action {
        CategoryAction::List => {
            let categories = client.list_categories(kind)?;
            if categories.is_empty() {
                println!("No categories.");
                return Ok(());
            }
            let rows: Vec<CategoryRow> = categories
                .iter()
                .map(|c| CategoryRow {
                    id: c.id,
                    name: c.name.clone(),
                    applies_to: c.applies_to.map(|e| e.to_string()).unwrap_or_default(),
                    active: if c.active { "yes" } else { "no" }.to_string(),
                })
                .collect();
            print_table(rows);
        }
        CategoryAction::Add {
            name,
            description,
            applies_to,
        } => {
            let created = client.create_category(
                kind,
                &CategoryInput {
                    name,
                    description,
                    applies_to,
                },
            )?;
            println!("Added category #{} {}", created.id, created.name);
        }
        CategoryAction::Rename { id, name } => {
            let existing = client
                .list_categories(kind)?
                .into_iter()
                .find(|c| c.id == id)
                .ok_or_else(|| FareflowError::Api {
                    status: 404,
                    message: format!("category #{id} not found"),
                })?;
            let updated = client.update_category(
                kind,
                id,
                &CategoryInput {
                    name,
                    description: existing.description,
                    applies_to: existing.applies_to,
                },
            )?;
            println!("Renamed category #{} to {}", updated.id, updated.name);
        }
    }
    Ok(())
}

fn print_summary_page(report: &DriverSummaryReport, symbol: &str) {
    let Some(page) = report.page() else {
        return;
    };

    if page.items.is_empty() {
        println!("No drivers in this date range.");
    } else {
        let rows: Vec<SummaryRow> = page
            .items
            .iter()
            .map(|d| SummaryRow {
                driver: d.driver_name.clone(),
                lease: format_money(d.totals.lease_revenue, symbol),
                card: format_money(d.totals.credit_card_revenue, symbol),
                charges: format_money(d.totals.charges_revenue, symbol),
                expenses: format_money(d.totals.total_expense, symbol),
                paid: format_money(d.totals.total_paid, symbol),
                net_owed: format_money(d.totals.net_owed, symbol),
            })
            .collect();
        print_table(rows);
    }

    let heading = if page.is_last() {
        "Grand totals".to_string()
    } else {
        format!(
            "Totals so far (pages 1-{} of {})",
            page.page_index + 1,
            page.total_pages
        )
    };
    print_totals(&heading, report.totals(), symbol);
}

fn print_totals(heading: &str, totals: &CumulativeTotals, symbol: &str) {
    let t = &totals.totals;
    println!();
    println!("{heading}");
    println!("  Drivers:         {}", totals.driver_count);
    println!("  Total revenue:   {}", format_money(t.total_revenue, symbol));
    println!("  Total expenses:  {}", format_money(t.total_expense, symbol));
    println!("  Paid:            {}", format_money(t.total_paid, symbol));
    println!("  Net owed:        {}", format_money(t.net_owed, symbol));
}

fn cmd_reports(cfg_dir: &Path, cmd: ReportCommands) -> Result<()> {
    let app = open_session(cfg_dir)?;
    let client = &app.client;
    let symbol = app.config.display.currency_symbol.as_str();

    let (kind, range) = match cmd {
        ReportCommands::DriverSummary {
            range,
            page_size,
            sort,
            direction,
            pages,
            last,
        } => {
            let mut query = ReportQuery::new(
                range.from,
                range.to,
                page_size.unwrap_or(app.config.reports.page_size),
            );
            query.sort = sort;
            query.direction = direction;

            let mut report = DriverSummaryReport::new();
            report.generate(client, query)?;

            if last {
                report.last_page(client)?;
            } else {
                for _ in 1..pages {
                    if report.page().map_or(true, |p| p.is_last()) {
                        break;
                    }
                    report.next_page(client)?;
                }
            }

            println!("Driver summary {} to {}", range.from, range.to);
            print_summary_page(&report, symbol);
            return Ok(());
        }
        ReportCommands::LeaseRevenue { range } => (AggregateKind::LeaseRevenue, range),
        ReportCommands::CreditCardRevenue { range } => (AggregateKind::CreditCardRevenue, range),
        ReportCommands::ChargesRevenue { range } => (AggregateKind::ChargesRevenue, range),
        ReportCommands::FixedExpenses { range } => (AggregateKind::FixedExpenses, range),
    };

    if range.to < range.from {
        return Err(FareflowError::Validation(format!(
            "end date {} is before start date {}",
            range.to, range.from
        )));
    }

    let report = client.aggregate_report(kind, range.from, range.to)?;
    println!("{kind} {} to {}", range.from, range.to);
    if !report.lines.is_empty() {
        let rows: Vec<AggregateRow> = report
            .lines
            .iter()
            .map(|l| AggregateRow {
                label: l.label.clone(),
                count: l.count.map(|c| c.to_string()).unwrap_or_default(),
                amount: format_money(l.amount, symbol),
            })
            .collect();
        print_table(rows);
    }
    println!("Total: {}", format_money(report.total_amount, symbol));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_is_grouped_and_signed() {
        assert_eq!(format_money(Decimal::new(123456789, 2), "$"), "$1,234,567.89");
        assert_eq!(format_money(Decimal::new(-5050, 2), "$"), "-$50.50");
        assert_eq!(format_money(Decimal::ZERO, "€"), "€0.00");
    }

    #[test]
    fn cell_edits_parse_one_based_rows() {
        let (row, field, value) = parse_cell_edit("2:fare_amount=75.50").unwrap();
        assert_eq!(row, 1);
        assert_eq!(field, ChargeField::FareAmount);
        assert_eq!(value, "75.50");

        let (_, field, value) = parse_cell_edit("3:tipAmount=").unwrap();
        assert_eq!(field, ChargeField::TipAmount);
        assert_eq!(value, "");

        let (_, _, value) = parse_cell_edit("1:pickup_address=12 Main St = Gate B").unwrap();
        assert_eq!(value, "12 Main St = Gate B");

        assert!(parse_cell_edit("0:paid=yes").is_err());
        assert!(parse_cell_edit("fare=10").is_err());
        assert!(parse_cell_edit("1:mileage=10").is_err());
    }
}
