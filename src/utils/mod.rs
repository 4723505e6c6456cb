pub mod cookie;
pub mod flash;
pub mod form;
pub mod hash;
pub mod html;
pub mod path;
pub mod session;
