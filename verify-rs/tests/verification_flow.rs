use async_trait::async_trait;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use verify_rs::error::{Result, VerifyError};
use verify_rs::resolver::{MxLookup, MxResolver};
use verify_rs::smtp::SmtpProber;
use verify_rs::verifier::{BatchVerifier, CatchAll, Category, EmailVerifier, Validity};

/// MX table mapping domains to hosts, counting lookups
struct TableMx {
    hosts: HashMap<String, String>,
    calls: AtomicUsize,
}

impl TableMx {
    fn new(entries: &[(&str, &str)]) -> Self {
        let hosts = entries
            .iter()
            .map(|(domain, host)| (domain.to_string(), host.to_string()))
            .collect();
        Self {
            hosts,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl MxLookup for TableMx {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<(u16, String)>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.hosts.get(domain) {
            Some(host) => Ok(vec![(10, host.clone())]),
            None => Err(VerifyError::DnsLookup(format!("{}: no records", domain))),
        }
    }
}

/// Start a mail host whose RCPT policy is `accept`
async fn mail_host(accept: fn(&str) -> bool) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let (reader, mut writer) = stream.into_split();
                let mut reader = BufReader::new(reader);
                if writer.write_all(b"220 mx.test ESMTP\r\n").await.is_err() {
                    return;
                }

                let mut line = String::new();
                loop {
                    line.clear();
                    match reader.read_line(&mut line).await {
                        Ok(0) | Err(_) => break,
                        Ok(_) => {}
                    }
                    let reply: &[u8] = if line.starts_with("RCPT TO:<") {
                        let recipient = line
                            .trim_start_matches("RCPT TO:<")
                            .split('>')
                            .next()
                            .unwrap_or("");
                        if accept(recipient) {
                            b"250 2.1.5 Ok\r\n"
                        } else {
                            b"550 5.1.1 User unknown\r\n"
                        }
                    } else {
                        b"250 Ok\r\n"
                    };
                    if writer.write_all(reply).await.is_err() {
                        break;
                    }
                }
            });
        }
    });

    addr
}

fn pipeline(lookup: Arc<TableMx>, port: u16, workers: usize) -> BatchVerifier {
    let resolver = Arc::new(MxResolver::new(lookup, 64, Duration::from_secs(5)));
    let prober = SmtpProber::new(
        port,
        Duration::from_secs(5),
        "probe@sender.test".to_string(),
        "verifier.test".to_string(),
    );
    BatchVerifier::new(
        Arc::new(EmailVerifier::new(resolver, prober)),
        workers,
        500,
        Duration::from_secs(20),
    )
}

#[tokio::test]
async fn test_batch_classifies_mixed_addresses() {
    // corp.test only knows sales@; open.test accepts anything
    let strict = mail_host(|recipient| recipient == "sales@corp.test").await;
    let open = mail_host(|_| true).await;

    // Both scripted hosts live on loopback; per-domain ports keep them apart
    let strict_lookup = Arc::new(TableMx::new(&[("corp.test", "127.0.0.1")]));
    let open_lookup = Arc::new(TableMx::new(&[("open.test", "127.0.0.1")]));

    let corp = pipeline(strict_lookup, strict.port(), 10);
    let input = vec!["sales@corp.test".to_string(), "ghost@corp.test".to_string()];
    let results = corp.verify_batch(&input).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].email, "sales@corp.test");
    assert_eq!(results[0].category, Category::Good);
    assert_eq!(results[0].valid, Validity::Valid);
    assert_eq!(results[0].catch_all, CatchAll::No);
    assert_eq!(results[1].email, "ghost@corp.test");
    assert_eq!(results[1].category, Category::Bad);
    assert_eq!(results[1].valid, Validity::Invalid);

    let any = pipeline(open_lookup, open.port(), 10);
    let input = vec!["anyone@open.test".to_string()];
    let results = any.verify_batch(&input).await.unwrap();

    assert_eq!(results[0].category, Category::Risky);
    assert_eq!(results[0].valid, Validity::Valid);
    assert_eq!(results[0].catch_all, CatchAll::Yes);
}

#[tokio::test]
async fn test_unresolvable_domain_is_bad_without_probing() {
    let lookup = Arc::new(TableMx::new(&[]));
    let batch = pipeline(Arc::clone(&lookup), 25, 10);

    let input = vec!["user@dead.test".to_string()];
    let results = batch.verify_batch(&input).await.unwrap();

    assert_eq!(results[0].category, Category::Bad);
    assert_eq!(results[0].valid, Validity::Invalid);
    assert_eq!(results[0].catch_all, CatchAll::Unknown);
}

#[tokio::test]
async fn test_mx_lookups_are_cached_within_batch() {
    let host = mail_host(|_| true).await;
    let lookup = Arc::new(TableMx::new(&[("open.test", "127.0.0.1")]));

    // One worker makes the batch sequential, so after the first address the
    // cache answers every MX query
    let batch = pipeline(Arc::clone(&lookup), host.port(), 1);

    let input: Vec<String> = (0..3).map(|i| format!("user{}@open.test", i)).collect();
    let results = batch.verify_batch(&input).await.unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_budget_caps_batch_wall_time() {
    // Host that accepts connections and never speaks
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(60)).await;
                drop(stream);
            });
        }
    });

    let lookup = Arc::new(TableMx::new(&[("slow.test", "127.0.0.1")]));
    let resolver = Arc::new(MxResolver::new(lookup, 64, Duration::from_secs(5)));
    let prober = SmtpProber::new(
        addr.port(),
        Duration::from_secs(30),
        "probe@sender.test".to_string(),
        "verifier.test".to_string(),
    );
    let batch = BatchVerifier::new(
        Arc::new(EmailVerifier::new(resolver, prober)),
        10,
        500,
        Duration::from_millis(300),
    );

    let started = Instant::now();
    let input = vec!["a@slow.test".to_string(), "b@slow.test".to_string()];
    let results = batch.verify_batch(&input).await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(results.len(), 2);
    for (result, email) in results.iter().zip(&input) {
        assert_eq!(&result.email, email);
        assert_eq!(result.category, Category::Risky);
        assert_eq!(result.valid, Validity::Unknown);
        assert_eq!(result.catch_all, CatchAll::Unknown);
    }
}
