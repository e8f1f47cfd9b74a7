//! Domain models and their JSON view formatting.
//!
//! Storage rows live here as plain structs; the `*View` types are the wire
//! shapes (camelCase keys, compatibility flags regrouped into a nested
//! object, category id replaced by category name).

pub mod cart;
pub mod content;
pub mod kit;
pub mod order;
pub mod product;
pub mod proposal;
pub mod user;

pub use cart::{Cart, CartItem, CartItemView, CartItemWithProduct, CartView};
pub use content::Content;
pub use kit::{Kit, KitDetail, KitItem, KitItemWithProduct};
pub use order::{NewOrder, NewOrderItem, Order, OrderItem};
pub use product::{
    Compatibility, NewProduct, Product, ProductPage, ProductView, ProductWithCategory,
    RelatedProductView,
};
pub use proposal::{Booking, NewProposal, Proposal};
pub use user::User;
