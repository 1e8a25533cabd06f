pub mod crud;

pub use crud::crud_router;
