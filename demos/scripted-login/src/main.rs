//! Scripted login binary
//!
//! Replays what an embedded web view would report during an OAuth login
//! with a self-signed identity provider: two redirects, two sub-resources
//! hitting the same certificate warning at once, and the final redirect URI.

use chrono::{TimeZone, Utc};
use scripted_login::{ConsoleHost, ConsoleSurface, ScriptedPrompt};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;
use webview_auth::{
    AuthFlowController, CertificateIdentity, FlowConfig, FlowEnvironment, LoadId,
    NavigationEvent, RedirectUriClassifier, StaticUrlProvider, TrustDecision, TrustDecisionCache,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scripted_login=info,webview_auth=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
    webview_auth::metrics::describe_metrics();

    println!("=== Scripted Login ===\n");

    let authorize = Url::parse(
        "https://idp.dev.internal/oauth2/authorize?client_id=desktop&response_type=code",
    )?;
    let redirect_uri = Url::parse("https://desktop.app.local/auth/callback")?;

    let trust = Arc::new(TrustDecisionCache::new(ScriptedPrompt::new(
        TrustDecision::Trust,
        Duration::from_millis(300),
    )));
    let env = FlowEnvironment::new(
        StaticUrlProvider::new(authorize.clone()),
        ConsoleSurface::new(),
        ConsoleHost,
        RedirectUriClassifier::new(redirect_uri.clone()),
        Arc::clone(&trust),
    );
    let controller = AuthFlowController::new(
        FlowConfig::new("Sign in to Desktop").with_reveal_delay(Duration::from_millis(150)),
        env,
    );

    println!(">>> start()");
    controller.start().await?.wait().await;

    // The identity provider bounces through two redirects before the login
    // form settles; the surface should stay hidden until then
    let hops = [
        authorize.clone(),
        Url::parse("https://idp.dev.internal/realms/corp/login-actions")?,
        Url::parse("https://idp.dev.internal/realms/corp/login")?,
    ];
    for hop in &hops {
        println!("\n>>> Started / Finished {hop}");
        controller
            .on_navigation_event(NavigationEvent::Started { url: hop.clone() })
            .await?;
        controller
            .on_navigation_event(NavigationEvent::Finished { url: hop.clone() })
            .await?;
    }

    // Stylesheet and script from the same self-signed host, in parallel
    let certificate = CertificateIdentity::new(
        "CN=idp.dev.internal",
        "CN=idp.dev.internal",
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).single().ok_or("invalid date")?,
        Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).single().ok_or("invalid date")?,
    );
    println!("\n>>> Two TLS warnings for {certificate}");
    let mut style = controller
        .on_navigation_event(NavigationEvent::TlsWarning {
            load: LoadId(11),
            certificate: certificate.clone(),
        })
        .await?;
    let mut script = controller
        .on_navigation_event(NavigationEvent::TlsWarning {
            load: LoadId(12),
            certificate,
        })
        .await?;
    style.wait().await;
    script.wait().await;
    println!("    phase: {}", controller.phase().await);

    // The user submits the form; the provider redirects to our callback
    let callback = redirect_uri.join("?code=SplxlOBeZQQYbYS6WxSbIA&state=af0ifjsldkj")?;
    println!("\n>>> Started / Finished {callback}");
    controller
        .on_navigation_event(NavigationEvent::Started {
            url: callback.clone(),
        })
        .await?;
    controller
        .on_navigation_event(NavigationEvent::Finished { url: callback })
        .await?;

    controller.shutdown(Duration::from_secs(1)).await?;

    let snapshot = controller.snapshot().await;
    println!("\n=== Journey finished ===");
    println!("  phase:    {}", snapshot.phase);
    println!("  attempts: {}", snapshot.attempts);
    println!("  trust:    {trust:?}");

    Ok(())
}
