pub mod accounts;
pub mod audit_logs;
pub mod brands;
pub mod cart_items;
pub mod carts;
pub mod categories;
pub mod comments;
pub mod order_items;
pub mod order_statuses;
pub mod orders;
pub mod product_statuses;
pub mod products;
pub mod profiles;
pub mod roles;

pub use accounts::Entity as Accounts;
pub use audit_logs::Entity as AuditLogs;
pub use brands::Entity as Brands;
pub use cart_items::Entity as CartItems;
pub use carts::Entity as Carts;
pub use categories::Entity as Categories;
pub use comments::Entity as Comments;
pub use order_items::Entity as OrderItems;
pub use order_statuses::Entity as OrderStatuses;
pub use orders::Entity as Orders;
pub use product_statuses::Entity as ProductStatuses;
pub use products::Entity as Products;
pub use profiles::Entity as Profiles;
pub use roles::Entity as Roles;
