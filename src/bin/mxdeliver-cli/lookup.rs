use anyhow::{Context, Result, bail};
use mxdeliver::{DeliveryOptions, Destination, MxClient};

#[cfg_attr(feature = "with-serde", derive(serde::Serialize))]
pub struct ExchangeSummary {
    pub preference: u16,
    pub exchange: String,
    pub addresses: Vec<String>,
    #[cfg_attr(feature = "with-serde", serde(skip_serializing_if = "Option::is_none"))]
    pub error: Option<String>,
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize))]
pub struct LookupSummary {
    pub domain: String,
    pub exchanges: Vec<ExchangeSummary>,
}

pub fn run_lookup(domain: &str, format: &str, ipv6: bool) -> Result<()> {
    let options = DeliveryOptions {
        ipv6,
        ..DeliveryOptions::default()
    };
    let client = MxClient::with_options(Destination::new(domain), &options)?;
    let list = client
        .lookup_mx(domain)
        .with_context(|| format!("resolve MX for {domain}"))?;

    let exchanges = list
        .iter()
        .map(|record| {
            let (addresses, error): (Vec<String>, Option<String>) =
                match client.lookup_ip(&record.exchange) {
                    Ok(ips) => (ips.iter().map(ToString::to_string).collect(), None),
                    Err(err) => (Vec::new(), Some(err.to_string())),
                };
            ExchangeSummary {
                preference: record.preference,
                exchange: record.exchange.clone(),
                addresses,
                error,
            }
        })
        .collect();
    let summary = LookupSummary {
        domain: domain.to_string(),
        exchanges,
    };

    match format {
        "human" => print_human(&summary),
        "json" => {
            #[cfg(feature = "with-serde")]
            {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
            #[cfg(not(feature = "with-serde"))]
            {
                bail!("format=json requires the 'with-serde' feature");
            }
        }
        other => bail!("unknown format '{other}', use human|json"),
    }
    Ok(())
}

fn print_human(summary: &LookupSummary) {
    println!("MX for {}:", summary.domain);
    for entry in &summary.exchanges {
        match &entry.error {
            Some(error) => println!("  {:>5}  {}  ! {error}", entry.preference, entry.exchange),
            None => println!(
                "  {:>5}  {}  [{}]",
                entry.preference,
                entry.exchange,
                entry.addresses.join(", ")
            ),
        }
    }
}
