//! Command handlers: one console view per subcommand.

use std::fmt::Display;
use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use inventario_auth::{GuardDecision, NewUser, Route, permissions_for};
use inventario_client::{
    AssumeYes, Categories, Confirm, DeleteOutcome, LoadReport, MovementRecorder, Products, ReportKind, ResourceKind,
    ResourceScreen, SessionManager, StockScreen, StockTab, Suppliers, Users, Warehouses, download_report,
    load_dashboard,
};
use inventario_catalog::Product;
use inventario_core::datetime::display;
use inventario_core::{Entity, SupplierId};
use inventario_inventory::{MovementDraft, StockInput};

use crate::cli::{CatalogCommand, Cli, Command, MovementCommand, ReportCommand, StockCommand};
use crate::render::{TableRow, print_page_footer, print_table};

/// View a command opens, if it is behind the route guard.
pub fn route(command: &Command) -> Option<Route> {
    match command {
        Command::Login { .. } | Command::Logout | Command::Whoami | Command::Register { .. } => None,
        Command::Reportes { .. } => None,
        Command::Dashboard { .. } => Some(Route::Dashboard),
        Command::Productos(_) => Some(Route::Products),
        Command::Almacenes(_) => Some(Route::Warehouses),
        Command::Categorias(_) => Some(Route::Categories),
        Command::Proveedores(_) => Some(Route::Suppliers),
        Command::Usuarios(_) => Some(Route::Users),
        Command::Stock(_) => Some(Route::Stock),
        Command::Movimientos(_) => Some(Route::Movements),
    }
}

fn open(session: &SessionManager, route: Route) -> Result<()> {
    match session.guard(route) {
        GuardDecision::Render => Ok(()),
        GuardDecision::Pending => bail!("session is still being resolved"),
        GuardDecision::Redirect(Route::Login) => bail!("not signed in; run `inventario login`"),
        GuardDecision::Redirect(_) => bail!("your role cannot open {}", route.path()),
    }
}

pub async fn dispatch(cli: &Cli, session: &Arc<SessionManager>) -> Result<()> {
    if let Some(route) = route(&cli.command) {
        open(session, route)?;
    }

    match &cli.command {
        Command::Login { email, password } => login(session, email, password.as_deref()).await,
        Command::Logout => {
            session.logout();
            println!("Sesión cerrada.");
            Ok(())
        }
        Command::Whoami => whoami(cli, session),
        Command::Register {
            nombre,
            email,
            password,
            rol,
        } => {
            let new_user = NewUser::new(nombre.as_str(), email.as_str(), password.as_str()).with_role(*rol);
            let user = session.register(&new_user).await?;
            if cli.json {
                return print_json(&user);
            }
            println!("Usuario {} creado ({}). Inicie sesión para continuar.", user.email, user.rol);
            Ok(())
        }
        Command::Dashboard { recent } => dashboard(cli, session, *recent).await,
        Command::Productos(cmd) => catalog::<Products>(cli, session, cmd).await,
        Command::Almacenes(cmd) => catalog::<Warehouses>(cli, session, cmd).await,
        Command::Categorias(cmd) => catalog::<Categories>(cli, session, cmd).await,
        Command::Proveedores(cmd) => catalog::<Suppliers>(cli, session, cmd).await,
        Command::Usuarios(cmd) => catalog::<Users>(cli, session, cmd).await,
        Command::Stock(cmd) => stock(cli, session, cmd).await,
        Command::Movimientos(cmd) => movements(cli, session, cmd).await,
        Command::Reportes { kind, out } => report(session, *kind, out).await,
    }
}

async fn login(session: &SessionManager, email: &str, password: Option<&str>) -> Result<()> {
    let password = match password {
        Some(p) => p.to_string(),
        None => prompt("Contraseña: ")?,
    };
    let user = session.login(email, &password).await?;
    println!("Sesión iniciada como {} ({}).", user.nombre, user.rol);
    Ok(())
}

fn whoami(cli: &Cli, session: &SessionManager) -> Result<()> {
    let Some(user) = session.user() else {
        bail!("not signed in; run `inventario login`");
    };
    let permissions = permissions_for(user.rol);
    if cli.json {
        return print_json(&json!({ "user": user, "permissions": permissions }));
    }

    println!("Nombre:  {}", user.nombre);
    println!("Email:   {}", if user.email.is_empty() { "-" } else { user.email.as_str() });
    println!("Rol:     {}", user.rol);
    println!();
    println!("Permisos:");
    for p in permissions {
        println!("  {p}");
    }
    Ok(())
}

async fn dashboard(cli: &Cli, session: &Arc<SessionManager>, recent: usize) -> Result<()> {
    let cancel = session.child_token();
    let dashboard = load_dashboard(session, &cancel).await?;
    let recent = dashboard.recent(recent);

    if cli.json {
        return print_json(&json!({ "summary": dashboard.summary, "recent": recent }));
    }

    if let Some(user) = session.user() {
        println!("Bienvenido, {}.", user.nombre);
    }
    if dashboard.products.is_empty() {
        return Ok(());
    }
    println!();
    println!(
        "Productos: {}  (activos: {}, inactivos: {})",
        dashboard.summary.total, dashboard.summary.activos, dashboard.summary.inactivos
    );
    println!();
    println!("Últimos productos:");
    let rows: Vec<Vec<String>> = recent.iter().map(|p| p.cells()).collect();
    print_table(<Product as TableRow>::HEADERS, &rows);
    Ok(())
}

async fn catalog<R>(cli: &Cli, session: &Arc<SessionManager>, command: &CatalogCommand) -> Result<()>
where
    R: ResourceKind,
    R::Entity: TableRow + Serialize,
    R::Create: DeserializeOwned,
    R::Update: DeserializeOwned,
    <R::Entity as Entity>::Id: Display + From<i64>,
{
    let mut screen = ResourceScreen::<R>::new(session.clone());

    match command {
        CatalogCommand::List { page, estado } => {
            screen.set_filter(*estado);
            screen.list().await?;
            screen.set_page(page.page);
            let items = screen.page_items();
            if cli.json {
                return print_json(&items);
            }
            let rows: Vec<Vec<String>> = items.iter().map(|item| item.cells()).collect();
            print_table(<R::Entity as TableRow>::HEADERS, &rows);
            print_page_footer(screen.page(), screen.page_count(), screen.visible().len());
        }
        CatalogCommand::Create { data } => {
            let input: R::Create = parse_data(data)?;
            let created = screen.create(&input).await?;
            print_record(cli, &created)?;
        }
        CatalogCommand::Update { id, data } => {
            let input: R::Update = parse_data(data)?;
            let updated = screen.update((*id).into(), &input).await?;
            print_record(cli, &updated)?;
        }
        CatalogCommand::Delete { id, yes } => {
            let confirm: &dyn Confirm = if *yes { &AssumeYes } else { &StdinConfirm };
            match screen.soft_delete((*id).into(), confirm).await? {
                DeleteOutcome::Deleted => println!("{} {} eliminado.", R::NOUN, id),
                DeleteOutcome::Declined => println!("Operación cancelada."),
            }
        }
        CatalogCommand::Restore { id } => {
            screen.restore((*id).into()).await?;
            println!("{} {} restaurado.", R::NOUN, id);
        }
    }
    Ok(())
}

async fn stock(cli: &Cli, session: &Arc<SessionManager>, command: &StockCommand) -> Result<()> {
    let mut screen = StockScreen::new(session.clone());
    warn_partial(&screen.load_catalogs().await?);

    match command {
        StockCommand::List {
            page,
            por_producto,
            almacen,
            producto,
        } => {
            match (*por_producto, *almacen, *producto) {
                (true, _, _) => screen.set_tab(StockTab::ByProduct).await?,
                (false, Some(id), _) => screen.select_warehouse(id.into()).await?,
                (false, None, Some(id)) => screen.select_product(id.into()).await?,
                (false, None, None) => screen.set_tab(StockTab::Detailed).await?,
            }
            screen.set_page(page.page);
            print_stock(cli, &screen)?;
        }
        StockCommand::Create { data } => {
            let input: StockInput = parse_data(data)?;
            screen.set_tab(StockTab::Detailed).await?;
            let created = screen.create_entry(&input).await?;
            print_record_json_or(cli, &created, || format!("Stock {} creado.", created.id))?;
        }
        StockCommand::Update { id, data } => {
            let input: StockInput = parse_data(data)?;
            screen.set_tab(StockTab::Detailed).await?;
            let updated = screen.update_entry((*id).into(), &input).await?;
            print_record_json_or(cli, &updated, || format!("Stock {} actualizado.", updated.id))?;
        }
    }
    Ok(())
}

fn print_stock(cli: &Cli, screen: &StockScreen) -> Result<()> {
    let total = match screen.tab() {
        StockTab::Detailed => {
            let entries = screen.page_entries();
            if cli.json {
                return print_json(entries);
            }
            let rows: Vec<Vec<String>> = entries
                .iter()
                .map(|e| {
                    vec![
                        e.id.to_string(),
                        screen.product_label(e.fk_producto).to_string(),
                        screen.warehouse_label(e.fk_almacen).to_string(),
                        e.cantidad_disponible.to_string(),
                        e.cantidad_reservada.to_string(),
                        display(e.fecha_ultima_actualizacion.as_ref()),
                    ]
                })
                .collect();
            print_table(
                &["ID", "PRODUCTO", "ALMACÉN", "DISPONIBLE", "RESERVADA", "ACTUALIZADO"],
                &rows,
            );
            screen.entries().len()
        }
        StockTab::ByProduct => {
            let totals = screen.page_totals();
            if cli.json {
                return print_json(totals);
            }
            let rows: Vec<Vec<String>> = totals
                .iter()
                .map(|t| {
                    vec![
                        screen.product_label(t.fk_producto).to_string(),
                        t.total_disponible.to_string(),
                    ]
                })
                .collect();
            print_table(&["PRODUCTO", "TOTAL DISPONIBLE"], &rows);
            screen.totals().len()
        }
        StockTab::ByWarehouse | StockTab::ForProduct => {
            let lines = screen.page_lines();
            if cli.json {
                return print_json(lines);
            }
            let rows: Vec<Vec<String>> = lines
                .iter()
                .map(|l| {
                    let product = match (&l.codigo_producto, &l.nombre_producto) {
                        (Some(codigo), Some(nombre)) => format!("{codigo} {nombre}"),
                        _ => l
                            .fk_producto
                            .map_or("-", |id| screen.product_label(id))
                            .to_string(),
                    };
                    vec![
                        product,
                        l.fk_almacen.map_or("-", |id| screen.warehouse_label(id)).to_string(),
                        l.cantidad_disponible.to_string(),
                        l.cantidad_reservada.to_string(),
                        display(l.fecha_ultima_actualizacion.as_ref()),
                    ]
                })
                .collect();
            print_table(
                &["PRODUCTO", "ALMACÉN", "DISPONIBLE", "RESERVADA", "ACTUALIZADO"],
                &rows,
            );
            screen.lines().len()
        }
    };
    print_page_footer(screen.page(), screen.page_count(), total);
    Ok(())
}

async fn movements(cli: &Cli, session: &Arc<SessionManager>, command: &MovementCommand) -> Result<()> {
    let mut recorder = MovementRecorder::new(session.clone());

    match command {
        MovementCommand::List { page } => {
            warn_partial(&recorder.load().await?);
            recorder.set_page(page.page);
            let items = recorder.page_movements();
            if cli.json {
                return print_json(&json!({ "stats": recorder.stats(), "movements": items }));
            }
            let rows: Vec<Vec<String>> = items
                .iter()
                .map(|m| {
                    vec![
                        m.id.to_string(),
                        display(m.fecha_movimiento.as_ref()),
                        recorder.product_label(m.fk_producto).to_string(),
                        recorder.warehouse_label(m.fk_almacen).to_string(),
                        m.tipo_movimiento.to_string(),
                        m.cantidad.to_string(),
                        m.cantidad_anterior.to_string(),
                        m.cantidad_nueva.to_string(),
                        recorder.supplier_label(m.fk_proveedor).to_string(),
                        m.motivo.clone().unwrap_or_default(),
                    ]
                })
                .collect();
            print_table(
                &[
                    "ID", "FECHA", "PRODUCTO", "ALMACÉN", "TIPO", "CANTIDAD", "ANTERIOR", "NUEVA", "PROVEEDOR",
                    "MOTIVO",
                ],
                &rows,
            );
            let stats = recorder.stats();
            println!(
                "Entradas: {}  Salidas: {}  Ajustes: {}  Devoluciones: {}",
                stats.entradas, stats.salidas, stats.ajustes, stats.devoluciones
            );
            print_page_footer(recorder.page(), recorder.page_count(), stats.total);
        }
        MovementCommand::Record {
            producto,
            almacen,
            tipo,
            cantidad,
            motivo,
            proveedor,
        } => {
            let draft = MovementDraft {
                fk_producto: Some((*producto).into()),
                fk_almacen: Some((*almacen).into()),
                tipo_movimiento: Some(*tipo),
                cantidad: cantidad.clone(),
                motivo: motivo.clone(),
                fk_proveedor: proveedor.map(SupplierId::from),
            };
            let created = recorder.record(draft).await?;
            print_record_json_or(cli, &created, || {
                format!(
                    "Movimiento {} registrado ({} {}): {} -> {}",
                    created.id,
                    created.tipo_movimiento,
                    created.cantidad,
                    created.cantidad_anterior,
                    created.cantidad_nueva
                )
            })?;
        }
    }
    Ok(())
}

async fn report(session: &Arc<SessionManager>, kind: ReportCommand, out: &Path) -> Result<()> {
    let kind = match kind {
        ReportCommand::StockBajo => ReportKind::LowStock,
        ReportCommand::InventarioGeneral => ReportKind::InventoryOverview,
        ReportCommand::Movimientos { desde, hasta } => ReportKind::Movements { desde, hasta },
    };
    let cancel = session.child_token();
    let report = download_report(session, kind, &cancel).await?;
    let path = report
        .save_in(out)
        .with_context(|| format!("could not write report into {}", out.display()))?;
    println!("Reporte guardado en {}", path.display());
    Ok(())
}

/// Asks on the terminal; anything but an explicit yes declines.
struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, question: &str) -> bool {
        match prompt(&format!("{question} [s/N] ")) {
            Ok(answer) => is_yes(&answer),
            Err(_) => false,
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "s" | "si" | "sí" | "y" | "yes"
    )
}

fn prompt(question: &str) -> Result<String> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{question}")?;
    stdout.flush()?;

    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("could not read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn parse_data<T: DeserializeOwned>(data: &str) -> Result<T> {
    serde_json::from_str(data).context("--data is not a valid JSON record")
}

fn warn_partial(report: &LoadReport) {
    for (part, err) in &report.failures {
        eprintln!("warning: could not load {part}: {}", err.user_message());
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_record<T: TableRow + Serialize>(cli: &Cli, record: &T) -> Result<()> {
    if cli.json {
        return print_json(record);
    }
    print_table(T::HEADERS, &[record.cells()]);
    Ok(())
}

fn print_record_json_or<T: Serialize>(cli: &Cli, record: &T, summary: impl FnOnce() -> String) -> Result<()> {
    if cli.json {
        return print_json(record);
    }
    println!("{}", summary());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("inventario").chain(args.iter().copied()))
    }

    #[test]
    fn account_commands_skip_the_guard() {
        assert_eq!(route(&parse(&["logout"]).command), None);
        assert_eq!(route(&parse(&["login", "--email", "a@b.com"]).command), None);
        assert_eq!(route(&parse(&["reportes", "stock-bajo"]).command), None);
    }

    #[test]
    fn screens_map_to_their_views() {
        assert_eq!(route(&parse(&["usuarios", "list"]).command), Some(Route::Users));
        assert_eq!(route(&parse(&["stock", "list"]).command), Some(Route::Stock));
        assert_eq!(route(&parse(&["movimientos", "list"]).command), Some(Route::Movements));
        assert_eq!(route(&parse(&["dashboard"]).command), Some(Route::Dashboard));
    }

    #[test]
    fn only_explicit_answers_confirm() {
        assert!(is_yes("s"));
        assert!(is_yes(" Sí\n"));
        assert!(is_yes("YES"));
        assert!(!is_yes(""));
        assert!(!is_yes("no"));
    }

    #[test]
    fn data_must_be_a_full_record() {
        let ok: Result<inventario_catalog::WarehouseInput> =
            parse_data(r#"{"nombre":"Central","ubicacion":"Quito","activo":true}"#);
        assert!(ok.is_ok());
        let bad: Result<inventario_catalog::WarehouseInput> = parse_data("{not json");
        assert!(bad.is_err());
    }
}
