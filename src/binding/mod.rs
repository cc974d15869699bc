// ABOUTME: Dynamically-typed call surface registered with the host.
// ABOUTME: Checks argument count and types synchronously, then hands off to the dispatcher.

mod error;

pub use error::{CallError, CallErrorKind};

use std::collections::BTreeMap;
use std::fmt;

use snafu::{OptionExt, ResultExt};

use crate::dispatch::{Dispatcher, SubmitError};
use crate::request::{ArgumentError, ImageInfoRequest};
use crate::unit::Completion;

use error::{ArgumentsSnafu, HostGoneSnafu, UnknownExportSnafu};

pub const GET_IMAGE_INFO: &str = "getImageInfo";
pub const GET_IMAGE_INFO_WITH_AUTH: &str = "getImageInfoWithAuth";

/// Host function value. Invoked at most once, with `(error, value)`.
pub type HostFunction = Box<dyn FnOnce(HostValue, HostValue) + Send + 'static>;

/// A value as the host passes it across the boundary.
pub enum HostValue {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Function(HostFunction),
}

impl HostValue {
    pub fn string(value: impl Into<String>) -> Self {
        HostValue::String(value.into())
    }

    pub fn function<F>(f: F) -> Self
    where
        F: FnOnce(HostValue, HostValue) + Send + 'static,
    {
        HostValue::Function(Box::new(f))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, HostValue::Null)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            HostValue::Undefined => "undefined",
            HostValue::Null => "null",
            HostValue::Bool(_) => "boolean",
            HostValue::Number(_) => "number",
            HostValue::String(_) => "string",
            HostValue::Function(_) => "function",
        }
    }
}

impl From<Option<String>> for HostValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(HostValue::Null, HostValue::String)
    }
}

impl fmt::Debug for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Undefined => write!(f, "undefined"),
            HostValue::Null => write!(f, "null"),
            HostValue::Bool(b) => write!(f, "{b}"),
            HostValue::Number(n) => write!(f, "{n}"),
            HostValue::String(s) => write!(f, "{s:?}"),
            HostValue::Function(_) => write!(f, "[Function]"),
        }
    }
}

type ExportFn = fn(&Dispatcher, Vec<HostValue>) -> Result<(), SubmitError>;

/// The functions this bridge exposes to the host, by name.
pub struct Exports {
    dispatcher: Dispatcher,
    functions: BTreeMap<&'static str, ExportFn>,
}

impl Exports {
    pub fn new(dispatcher: Dispatcher) -> Self {
        let mut functions: BTreeMap<&'static str, ExportFn> = BTreeMap::new();
        functions.insert(GET_IMAGE_INFO, get_image_info);
        functions.insert(GET_IMAGE_INFO_WITH_AUTH, get_image_info_with_auth);
        Self {
            dispatcher,
            functions,
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.functions.keys().copied()
    }

    /// Call an exported function. Always returns `undefined` on success; the
    /// lookup result arrives later through the callback argument.
    ///
    /// # Errors
    ///
    /// Fails synchronously on an unknown name, malformed arguments, or a host
    /// that has shut down. The callback is dropped uncalled in that case.
    pub fn call(&self, name: &str, args: Vec<HostValue>) -> Result<HostValue, CallError> {
        let function = self
            .functions
            .get(name)
            .context(UnknownExportSnafu { name })?;

        match function(&self.dispatcher, args) {
            Ok(()) => Ok(HostValue::Undefined),
            Err(SubmitError::InvalidArgument(source)) => {
                Err(source).context(ArgumentsSnafu { name })
            }
            Err(SubmitError::HostGone) => HostGoneSnafu { name }.fail(),
        }
    }
}

/// `getImageInfo(imageRef, tlsHostname, tlsState, callback)`
fn get_image_info(dispatcher: &Dispatcher, args: Vec<HostValue>) -> Result<(), SubmitError> {
    let [image_ref, tls_hostname, tls_state, callback] = take_args::<4>(args)?;
    let image_ref = expect_string(image_ref, 0, "imageRef")?;
    let tls_hostname = expect_string(tls_hostname, 1, "tlsHostnameOverride")?;
    let tls_state = expect_string(tls_state, 2, "tlsStateOverride")?;
    let callback = expect_function(callback, 3)?;

    let request = ImageInfoRequest::anonymous(&image_ref, &tls_hostname, &tls_state)?;
    dispatcher.submit(request, completion_for(callback))
}

/// `getImageInfoWithAuth(imageRef, username, password, tlsHostname, tlsState, callback)`
fn get_image_info_with_auth(
    dispatcher: &Dispatcher,
    args: Vec<HostValue>,
) -> Result<(), SubmitError> {
    let [image_ref, username, password, tls_hostname, tls_state, callback] =
        take_args::<6>(args)?;
    let image_ref = expect_string(image_ref, 0, "imageRef")?;
    let username = expect_string(username, 1, "username")?;
    let password = expect_string(password, 2, "password")?;
    let tls_hostname = expect_string(tls_hostname, 3, "tlsHostnameOverride")?;
    let tls_state = expect_string(tls_state, 4, "tlsStateOverride")?;
    let callback = expect_function(callback, 5)?;

    let request = ImageInfoRequest::authenticated(
        &image_ref,
        &username,
        &password,
        &tls_hostname,
        &tls_state,
    )?;
    dispatcher.submit(request, completion_for(callback))
}

fn take_args<const N: usize>(args: Vec<HostValue>) -> Result<[HostValue; N], ArgumentError> {
    let got = args.len();
    <[HostValue; N]>::try_from(args).map_err(|_| ArgumentError::WrongArity { expected: N, got })
}

fn expect_string(
    value: HostValue,
    index: usize,
    name: &'static str,
) -> Result<String, ArgumentError> {
    match value {
        HostValue::String(s) => Ok(s),
        _ => Err(ArgumentError::NotAString { index, name }),
    }
}

fn expect_function(value: HostValue, index: usize) -> Result<HostFunction, ArgumentError> {
    match value {
        HostValue::Function(f) => Ok(f),
        _ => Err(ArgumentError::NotAFunction { index }),
    }
}

fn completion_for(callback: HostFunction) -> Completion {
    Completion::callback(move |err, value| callback(HostValue::from(err), HostValue::from(value)))
}
