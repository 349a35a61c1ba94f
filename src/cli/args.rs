//! CLI argument definitions using clap

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueHint};

use crate::application::services::{NodeSortKey, ProductSortKey, SortOrder};
use crate::domain::Debt;

/// Supplier network manager: factories, retail chains and sole proprietors
#[derive(Parser, Debug)]
#[command(name = "supplynet")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity: -v info, -vv debug, -vvv trace
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Catalog data file (default: from config)
    #[arg(long, global = true, env = "SUPPLYNET_DATA_FILE", value_hint = ValueHint::FilePath)]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage network nodes
    Node {
        #[command(subcommand)]
        command: NodeCommands,
    },

    /// Manage products
    Product {
        #[command(subcommand)]
        command: ProductCommands,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum NodeCommands {
    /// Create a node
    Add(NodeAddArgs),

    /// Update a node (debt cannot be changed here)
    Update(NodeUpdateArgs),

    /// Delete a node and its products
    Delete {
        /// Node id
        id: u64,
    },

    /// Show a node with level and products
    Show {
        /// Node id
        id: u64,
    },

    /// List nodes
    List {
        /// Country contains (case-insensitive)
        #[arg(long)]
        country: Option<String>,
        /// Exact city
        #[arg(long)]
        city: Option<String>,
        /// Search name, city, country and email
        #[arg(short, long)]
        search: Option<String>,
        /// Order by name, city, country or created_at; prefix '-' for descending
        #[arg(long = "order-by", allow_hyphen_values = true)]
        order_by: Option<SortOrder<NodeSortKey>>,
    },

    /// Print the hierarchy level of a node
    Level {
        /// Node id
        id: u64,
    },

    /// Zero the debt of the given nodes
    #[command(name = "clear-debt")]
    ClearDebt {
        /// Node ids
        #[arg(required = true, num_args = 1..)]
        ids: Vec<u64>,
    },

    /// Show the supplier hierarchy as tree
    Tree,
}

#[derive(Args, Debug)]
pub struct NodeAddArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub country: String,
    #[arg(long)]
    pub city: String,
    #[arg(long)]
    pub street: String,
    #[arg(long)]
    pub house_number: String,
    /// Supplier node id (omit for a factory)
    #[arg(long)]
    pub supplier: Option<u64>,
    /// Debt towards the supplier, e.g. 1500.50
    #[arg(long, default_value = "0")]
    pub debt: Debt,
}

#[derive(Args, Debug)]
pub struct NodeUpdateArgs {
    /// Node id
    pub id: u64,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub country: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub street: Option<String>,
    #[arg(long)]
    pub house_number: Option<String>,
    /// New supplier node id
    #[arg(long, conflicts_with = "no_supplier")]
    pub supplier: Option<u64>,
    /// Detach from the current supplier
    #[arg(long)]
    pub no_supplier: bool,
}

#[derive(Subcommand, Debug)]
pub enum ProductCommands {
    /// Create a product
    Add {
        /// Owner node id
        #[arg(long)]
        owner: u64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        model: String,
        /// Release date (YYYY-MM-DD)
        #[arg(long)]
        release_date: NaiveDate,
    },

    /// Update a product
    Update {
        /// Product id
        id: u64,
        /// New owner node id
        #[arg(long)]
        owner: Option<u64>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        model: Option<String>,
        /// Release date (YYYY-MM-DD)
        #[arg(long)]
        release_date: Option<NaiveDate>,
    },

    /// Delete a product
    Delete {
        /// Product id
        id: u64,
    },

    /// Show a product
    Show {
        /// Product id
        id: u64,
    },

    /// List products
    List {
        /// Only products of this node
        #[arg(long)]
        owner: Option<u64>,
        /// Search title, model, owner name and owner city
        #[arg(short, long)]
        search: Option<String>,
        /// Order by release_date or title; prefix '-' for descending
        #[arg(long = "order-by", allow_hyphen_values = true)]
        order_by: Option<SortOrder<ProductSortKey>>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Show config paths
    Path,
}
