pub const USER_AGENT: &str = concat!("whatif/", env!("CARGO_PKG_VERSION"));

/// Displays a number with thousands separators, `12345` as `12,345`.
pub struct Readable<N>
where
    N: std::fmt::Display,
{
    inner: N,
}

impl<N> std::fmt::Display for Readable<N>
where
    N: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let digits = self.inner.to_string();
        let (sign, digits) = match digits.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", digits.as_str()),
        };

        let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
        out.push_str(sign);

        for (i, c) in digits.chars().enumerate() {
            if i != 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }

            out.push(c);
        }

        f.pad(&out)
    }
}

pub trait IntoReadable: std::fmt::Display + Sized {
    fn into_readable(self) -> Readable<Self> {
        Readable { inner: self }
    }
}

impl IntoReadable for usize {}
impl IntoReadable for u32 {}
impl IntoReadable for u64 {}
impl IntoReadable for i64 {}
