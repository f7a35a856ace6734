pub mod shake;

pub(crate) use shake::XmssHasher;
