//! Widgets composing the catalog screen

pub mod pagination_bar;
pub mod product_grid;
