//! Command dispatch: maps parsed arguments onto services

use std::io;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::{NodeQuery, NodeView, ProductQuery, ProductView};
use crate::cli::args::{
    Cli, Commands, ConfigCommands, NodeAddArgs, NodeCommands, NodeUpdateArgs, ProductCommands,
};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::{NodeDraft, NodeId, NodePatch, ProductDraft, ProductId, ProductPatch};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::InfraError;
use crate::util::path::display_relative;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage("no command given, see --help".to_string()));
    };

    match command {
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        Commands::Config { command } => {
            let settings = load_settings(cli)?;
            run_config(command, &settings)
        }
        Commands::Node { command } => {
            let container = ServiceContainer::new(load_settings(cli)?);
            run_node(command, &container)
        }
        Commands::Product { command } => {
            let container = ServiceContainer::new(load_settings(cli)?);
            run_product(command, &container)
        }
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let settings = Settings::load()?.with_data_file(cli.data.clone());
    debug!("data file: {}", settings.data_file.display());
    Ok(settings)
}

// ============================================================
// node
// ============================================================

#[instrument(skip(container))]
fn run_node(command: &NodeCommands, container: &ServiceContainer) -> CliResult<()> {
    let network = &container.network;
    match command {
        NodeCommands::Add(args) => {
            let view = network.create(node_draft(args))?;
            output::success(&format!("Created node #{}", view.node.id));
            print_node(&view);
        }
        NodeCommands::Update(args) => {
            let view = network.update(NodeId(args.id), node_patch(args))?;
            output::success(&format!("Updated node #{}", view.node.id));
            print_node(&view);
        }
        NodeCommands::Delete { id } => {
            let node = network.delete(NodeId(*id))?;
            output::action("Deleted", &format!("#{} {}", node.id, node));
        }
        NodeCommands::Show { id } => {
            let view = network.get(NodeId(*id))?;
            print_node(&view);
        }
        NodeCommands::List {
            country,
            city,
            search,
            order_by,
        } => {
            let query = NodeQuery {
                country: country.clone(),
                city: city.clone(),
                search: search.clone(),
                ordering: *order_by,
            };
            let views = network.list(&query)?;
            if views.is_empty() {
                output::warning("no nodes found");
            }
            for view in &views {
                output::info(&node_line(view));
            }
        }
        NodeCommands::Level { id } => {
            let level = network.level(NodeId(*id))?;
            output::info(&level);
        }
        NodeCommands::ClearDebt { ids } => {
            let ids: Vec<NodeId> = ids.iter().copied().map(NodeId).collect();
            let cleared = network.clear_debt(&ids)?;
            for id in &cleared {
                output::success_detail(&format!("#{id} debt cleared"));
            }
        }
        NodeCommands::Tree => {
            let trees = network.forest()?;
            if trees.is_empty() {
                output::warning("catalog is empty");
            }
            for tree in &trees {
                output::info(tree);
            }
        }
    }
    Ok(())
}

fn node_draft(args: &NodeAddArgs) -> NodeDraft {
    NodeDraft {
        name: args.name.clone(),
        email: args.email.clone(),
        country: args.country.clone(),
        city: args.city.clone(),
        street: args.street.clone(),
        house_number: args.house_number.clone(),
        supplier: args.supplier.map(NodeId),
        debt: args.debt,
    }
}

fn node_patch(args: &NodeUpdateArgs) -> NodePatch {
    let supplier = if args.no_supplier {
        Some(None)
    } else {
        args.supplier.map(|id| Some(NodeId(id)))
    };
    NodePatch {
        name: args.name.clone(),
        email: args.email.clone(),
        country: args.country.clone(),
        city: args.city.clone(),
        street: args.street.clone(),
        house_number: args.house_number.clone(),
        supplier,
    }
}

fn node_line(view: &NodeView) -> String {
    let node = &view.node;
    let supplier = node
        .supplier
        .map(|s| format!("#{s}"))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "#{:<4} {:<30} {:<16} {:<16} level {} ({}) supplier {} debt {}",
        node.id,
        node.name,
        node.country,
        node.city,
        view.level,
        view.level_name,
        supplier,
        node.debt
    )
}

fn print_node(view: &NodeView) {
    let node = &view.node;
    output::header(&format!("#{} {}", node.id, node.name));
    output::detail(&format!("level:    {} ({})", view.level, view.level_name));
    output::detail(&format!(
        "supplier: {}",
        node.supplier
            .map(|s| format!("#{s}"))
            .unwrap_or_else(|| "-".to_string())
    ));
    output::detail(&format!("email:    {}", node.email));
    output::detail(&format!(
        "address:  {} {}, {}, {}",
        node.street, node.house_number, node.city, node.country
    ));
    output::detail(&format!("debt:     {}", node.debt));
    output::detail(&format!("created:  {}", node.created_at.to_rfc3339()));
    if !view.products.is_empty() {
        output::detail("products:");
        for product in &view.products {
            output::detail(&format!("  #{} {} ({})", product.id, product, product.release_date));
        }
    }
}

// ============================================================
// product
// ============================================================

#[instrument(skip(container))]
fn run_product(command: &ProductCommands, container: &ServiceContainer) -> CliResult<()> {
    let products = &container.products;
    match command {
        ProductCommands::Add {
            owner,
            title,
            model,
            release_date,
        } => {
            let view = products.create(ProductDraft {
                owner: NodeId(*owner),
                title: title.clone(),
                model: model.clone(),
                release_date: *release_date,
            })?;
            output::success(&format!("Created product #{}", view.product.id));
            output::info(&product_line(&view));
        }
        ProductCommands::Update {
            id,
            owner,
            title,
            model,
            release_date,
        } => {
            let patch = ProductPatch {
                owner: owner.map(NodeId),
                title: title.clone(),
                model: model.clone(),
                release_date: *release_date,
            };
            let view = products.update(ProductId(*id), patch)?;
            output::success(&format!("Updated product #{}", view.product.id));
            output::info(&product_line(&view));
        }
        ProductCommands::Delete { id } => {
            let product = products.delete(ProductId(*id))?;
            output::action("Deleted", &format!("#{} {}", product.id, product));
        }
        ProductCommands::Show { id } => {
            let view = products.get(ProductId(*id))?;
            output::info(&product_line(&view));
        }
        ProductCommands::List {
            owner,
            search,
            order_by,
        } => {
            let query = ProductQuery {
                owner: owner.map(NodeId),
                search: search.clone(),
                ordering: *order_by,
            };
            let views = products.list(&query)?;
            if views.is_empty() {
                output::warning("no products found");
            }
            for view in &views {
                output::info(&product_line(view));
            }
        }
    }
    Ok(())
}

fn product_line(view: &ProductView) -> String {
    let product = &view.product;
    format!(
        "#{:<4} {:<30} {:<16} released {}  owner #{} {}",
        product.id,
        product.title,
        product.model,
        product.release_date,
        product.owner,
        view.owner_name
    )
}

// ============================================================
// config
// ============================================================

fn run_config(command: &ConfigCommands, settings: &Settings) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let text = settings.to_toml()?;
            output::info(&text);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("config", &path.display()),
                None => output::warning("no config directory on this platform"),
            }
            output::action("data", &display_relative(&settings.data_file).display());
        }
        ConfigCommands::Init { force } => {
            let path = global_config_path()
                .ok_or_else(|| CliError::Usage("no config directory on this platform".into()))?;
            if path.exists() && !force {
                return Err(CliError::Usage(format!(
                    "{} exists, use --force to overwrite",
                    path.display()
                )));
            }
            let fs = RealFileSystem;
            fs.ensure_parent(&path)
                .and_then(|_| fs.write(&path, &Settings::template()))
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::action("Created", &path.display());
        }
    }
    Ok(())
}
