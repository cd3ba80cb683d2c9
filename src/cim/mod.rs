//! CIM Object Model
//!
//! Values, object paths and instances as exchanged with a WBEM server,
//! plus the primitives built on them:
//! - [`decode`]: typed property extraction
//! - [`resolver`]: instance lookup by class and by property
//! - [`memory`]: an in-memory [`WbemClient`](crate::domain::WbemClient)

pub mod decode;
pub mod instance;
pub mod memory;
pub mod path;
pub mod resolver;
pub mod value;

pub use decode::{decode, decode_optional, decode_value, FromCimValue};
pub use instance::{CimInstance, CimProperty, MethodResult, ParamValue};
pub use memory::MemoryWbem;
pub use path::ObjectPath;
pub use resolver::InstanceResolver;
pub use value::CimValue;
