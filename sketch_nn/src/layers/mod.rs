mod conv;
mod dense;
mod dropout;
mod pool;

pub use conv::Conv2d;
pub use dense::Dense;
pub use dropout::Dropout;
pub use pool::MaxPool2d;
