use color_eyre::eyre::{Result, eyre};

use dynaform::{
    FieldMap,
    form::{MAX_FIELDS, validate},
    posts::PostsApi,
};

#[derive(clap::Args, Debug)]
pub struct Args {
    /// Field value, format: KEY=VALUE. Repeat for every field.
    #[arg(
        long = "field",
        value_name = "KEY=VALUE",
        action = clap::ArgAction::Append,
        required = true
    )]
    pub fields: Vec<String>,
}

pub async fn command(api: &dyn PostsApi, args: Args) -> Result<()> {
    let values = parse_fields(&args.fields)?;
    api.create(&values).await?;
    tracing::info!(fields = values.len(), "Record created");
    println!("{}", serde_json::to_string(&values)?);
    Ok(())
}

fn parse_fields(raw: &[String]) -> Result<FieldMap> {
    let mut names = Vec::with_capacity(raw.len());
    let mut values = FieldMap::new();
    for pair in raw {
        let (key, value) =
            parse_pair(pair).map_err(|err| eyre!("Invalid --field value ({pair}): {err}"))?;
        if values.contains_key(key) {
            return Err(eyre!("Duplicate field: {key}"));
        }
        names.push(key.to_string());
        values.insert(key, value);
    }
    if names.len() > MAX_FIELDS {
        return Err(eyre!("At most {MAX_FIELDS} fields are allowed, got {}", names.len()));
    }

    let errors = validate(&names, &values);
    if let Some(field) = names.iter().find(|name| errors.contains_key(*name)) {
        return Err(eyre!("{field}: {}", errors[field]));
    }
    Ok(values)
}

fn parse_pair(raw: &str) -> Result<(&str, &str), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| "expected KEY=VALUE".to_string())?;
    let key = key.trim();
    if key.is_empty() {
        return Err("field name cannot be empty".to_string());
    }
    Ok((key, value))
}
