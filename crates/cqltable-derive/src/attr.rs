use syn::{Attribute, Error, Expr, ExprLit, Lit, LitStr, Meta};

///
/// FieldAttrs
///
/// Naming and storage annotations collected from one field.
///

#[derive(Default)]
pub struct FieldAttrs {
    pub rename: Option<String>,
    pub alias: Option<String>,
    pub type_hint: Option<String>,
    pub skip: bool,
}

impl FieldAttrs {
    pub fn parse(attrs: &[Attribute]) -> Result<Self, Error> {
        let mut out = Self::default();

        for attr in attrs {
            if attr.path().is_ident("cql") {
                out.parse_cql(attr)?;
            } else if attr.path().is_ident("cql_type") {
                out.type_hint = Some(parse_name_value(attr)?);
            }
        }

        Ok(out)
    }

    // #[cql("name")] or #[cql(rename = "name", skip)]
    fn parse_cql(&mut self, attr: &Attribute) -> Result<(), Error> {
        if let Ok(lit) = attr.parse_args::<LitStr>() {
            self.alias = Some(non_empty(&lit)?);
            return Ok(());
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let lit: LitStr = meta.value()?.parse()?;
                self.rename = Some(non_empty(&lit)?);
                Ok(())
            } else if meta.path.is_ident("skip") {
                self.skip = true;
                Ok(())
            } else {
                Err(meta.error("expected `rename = \"...\"` or `skip`"))
            }
        })
    }
}

// #[cql_type = "set"]
fn parse_name_value(attr: &Attribute) -> Result<String, Error> {
    if let Meta::NameValue(nv) = &attr.meta
        && let Expr::Lit(ExprLit {
            lit: Lit::Str(lit), ..
        }) = &nv.value
    {
        return non_empty(lit);
    }

    Err(Error::new_spanned(attr, "expected `#[cql_type = \"...\"]`"))
}

fn non_empty(lit: &LitStr) -> Result<String, Error> {
    let value = lit.value();
    if value.is_empty() {
        return Err(Error::new_spanned(lit, "column name must not be empty"));
    }

    Ok(value)
}
