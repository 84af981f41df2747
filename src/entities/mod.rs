//! Entity type definitions

pub mod department;
pub mod primer;
pub mod site;

pub use department::Department;
pub use drop_test::DropTest;
pub use primer::Primer;
pub use site::Site;
