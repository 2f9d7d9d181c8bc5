//! Command-line surface of the console.
//!
//! Every subcommand opens the same view the browser console had and is gated
//! by the route guard before anything is sent.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use inventario_auth::Role;
use inventario_client::StatusFilter;
use inventario_inventory::MovementType;

#[derive(Parser, Debug)]
#[command(name = "inventario")]
#[command(author, version, about = "Inventory management console", long_about = None)]
pub struct Cli {
    /// Backend URL (overrides INVENTARIO_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and keep the session for later commands
    Login {
        #[arg(long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(long, env = "INVENTARIO_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in user and what they may do
    Whoami,

    /// Create an account (does not sign in)
    Register {
        #[arg(long)]
        nombre: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "INVENTARIO_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, default_value = "empleado")]
        rol: Role,
    },

    /// Product overview and latest products
    Dashboard {
        /// How many recent products to show
        #[arg(long, default_value_t = 5)]
        recent: usize,
    },

    #[command(subcommand)]
    Productos(CatalogCommand),

    #[command(subcommand)]
    Almacenes(CatalogCommand),

    #[command(subcommand)]
    Categorias(CatalogCommand),

    #[command(subcommand)]
    Proveedores(CatalogCommand),

    #[command(subcommand)]
    Usuarios(CatalogCommand),

    /// Stock per warehouse
    #[command(subcommand)]
    Stock(StockCommand),

    /// Inventory movements
    #[command(subcommand)]
    Movimientos(MovementCommand),

    /// Download a PDF report
    Reportes {
        #[command(subcommand)]
        kind: ReportCommand,

        /// Directory the PDF is written to
        #[arg(long, default_value = ".", global = true)]
        out: std::path::PathBuf,
    },
}

#[derive(Args, Debug, Clone, Copy)]
pub struct PageArgs {
    /// Page to show (1-based)
    #[arg(long, default_value_t = 1)]
    pub page: usize,
}

/// Operations shared by every catalog.
#[derive(Subcommand, Debug)]
pub enum CatalogCommand {
    /// List records (admins also see deleted ones)
    List {
        #[command(flatten)]
        page: PageArgs,
        /// todos, activos or inactivos
        #[arg(long, default_value = "todos")]
        estado: StatusFilter,
    },
    /// Create a record from a JSON body
    Create {
        #[arg(long)]
        data: String,
    },
    /// Replace a record's fields from a JSON body
    Update {
        #[arg(value_parser = clap::value_parser!(i64).range(1..))]
        id: i64,
        #[arg(long)]
        data: String,
    },
    /// Soft-delete a record
    Delete {
        #[arg(value_parser = clap::value_parser!(i64).range(1..))]
        id: i64,
        /// Do not ask for confirmation
        #[arg(long, short)]
        yes: bool,
    },
    /// Bring a soft-deleted record back
    Restore {
        #[arg(value_parser = clap::value_parser!(i64).range(1..))]
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
pub enum StockCommand {
    /// Show one of the stock views (every row by default)
    List {
        #[command(flatten)]
        page: PageArgs,
        /// Totals per product across warehouses
        #[arg(long, conflicts_with_all = ["almacen", "producto"])]
        por_producto: bool,
        /// Rows of one warehouse
        #[arg(long, conflicts_with = "producto")]
        almacen: Option<i64>,
        /// Rows of one product
        #[arg(long)]
        producto: Option<i64>,
    },
    /// Create a stock row from a JSON body
    Create {
        #[arg(long)]
        data: String,
    },
    /// Update a stock row from a JSON body
    Update {
        #[arg(value_parser = clap::value_parser!(i64).range(1..))]
        id: i64,
        #[arg(long)]
        data: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum MovementCommand {
    /// List movements (your own unless you are an admin)
    List {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Register a stock movement
    Record {
        #[arg(long)]
        producto: i64,
        #[arg(long)]
        almacen: i64,
        /// entrada, salida, ajuste or devolucion
        #[arg(long)]
        tipo: MovementType,
        #[arg(long)]
        cantidad: String,
        #[arg(long, default_value = "")]
        motivo: String,
        /// Required for entradas
        #[arg(long)]
        proveedor: Option<i64>,
    },
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ReportCommand {
    /// Products at or below their minimum stock
    StockBajo,
    /// Full inventory snapshot
    InventarioGeneral,
    /// Movements, optionally within a date range (YYYY-MM-DD)
    Movimientos {
        #[arg(long)]
        desde: Option<NaiveDate>,
        #[arg(long)]
        hasta: Option<NaiveDate>,
    },
}
