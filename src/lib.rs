pub mod align;
pub mod convert;
pub mod densify;
pub mod error;
pub mod model;
pub mod nodata;
pub mod quantize;
pub mod resample;
pub mod writer;

pub use align::{align, AlignOptions, AlignedBand};
pub use convert::{convert_for_eval, ConvertedProduct, TARGET_GSD};
pub use densify::densify;
pub use error::{EvalError, Result};
pub use model::{EvalMetadata, GridDescriptor, GridSource, RegistrationOffset};
pub use quantize::{quantize, QuantizedDsm, NO_DATA_CODE, Z_SCALE};
pub use resample::{resize_nearest, ResampleAlg};
