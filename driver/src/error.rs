use error_stack::Report;
use kernel::interface::client::TransportError;
use kernel::KernelError;

pub trait ConvertError {
    type Ok;
    type Context: error_stack::Context;
    fn convert_error(self) -> error_stack::Result<Self::Ok, Self::Context>;
}

impl<T> ConvertError for Result<T, dotenvy::Error> {
    type Ok = T;
    type Context = KernelError;
    fn convert_error(self) -> error_stack::Result<T, KernelError> {
        self.map_err(|error| Report::new(error).change_context(KernelError::Internal))
    }
}

impl<T> ConvertError for Result<T, reqwest::Error> {
    type Ok = T;
    type Context = TransportError;
    fn convert_error(self) -> error_stack::Result<T, TransportError> {
        self.map_err(|error| {
            let context = if error.is_timeout() {
                TransportError::Timeout
            } else if error.is_decode() {
                TransportError::Decode
            } else if let Some(status) = error.status() {
                TransportError::Status(status.as_u16())
            } else {
                TransportError::Connection
            };
            Report::new(error).change_context(context)
        })
    }
}
