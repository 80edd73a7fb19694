//! Analysis Page

use leptos::prelude::*;

use crate::api::{self, AnalysisResult, AnalysisState, FAILURE_MESSAGE};
use crate::components::{ErrorBanner, LoadingLog, ResultCard};

#[component]
pub fn HomePage() -> impl IntoView {
    let (name, set_name) = signal(String::new());
    let (contract_address, set_contract_address) = signal(String::new());
    let (status, set_status) = signal(AnalysisState::Idle);
    let (result, set_result) = signal(Option::<AnalysisResult>::None);
    let (error, set_error) = signal(Option::<String>::None);

    let analyzing = move || status.get() == AnalysisState::Analyzing;

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let (n, ca) = (name.get(), contract_address.get());
        if n.trim().is_empty() || ca.trim().is_empty() || analyzing() {
            return;
        }

        set_status.set(AnalysisState::Analyzing);
        set_error.set(None);
        set_result.set(None);

        leptos::task::spawn_local(async move {
            match api::analyze(&n, &ca).await {
                Ok(snapshot) => {
                    set_result.set(snapshot.result);
                    set_error.set(snapshot.error);
                    set_status.set(snapshot.state);
                }
                Err(e) => {
                    leptos::logging::error!("analysis request failed: {}", e);
                    set_error.set(Some(FAILURE_MESSAGE.into()));
                    set_status.set(AnalysisState::Error);
                }
            }
        });
    };

    view! {
        <div class="home">
            <header class="hero">
                <div class="badge">"SYSTEM_ONLINE"</div>
                <h1>"MEME " <span class="accent">"AGENT"</span></h1>
                <p class="tagline">"AI-powered narrative decoding for crypto assets. Paste the CA, we find the alpha."</p>
            </header>

            <form class="search" on:submit=on_submit>
                <div class="field">
                    <label>"Asset Name"</label>
                    <input
                        type="text"
                        placeholder="e.g. PEPE"
                        required=true
                        prop:value=move || name.get()
                        on:input=move |ev| set_name.set(event_target_value(&ev))
                    />
                </div>
                <div class="field">
                    <label>"Contract Address (CA)"</label>
                    <input
                        type="text"
                        class="mono"
                        placeholder="0x..."
                        required=true
                        prop:value=move || contract_address.get()
                        on:input=move |ev| set_contract_address.set(event_target_value(&ev))
                    />
                </div>
                <button type="submit" class="btn btn-primary" disabled=analyzing>
                    {move || if analyzing() { "Scanning Blockchain..." } else { "Initialize Analysis" }}
                </button>
            </form>

            <Show when=analyzing>
                <LoadingLog />
            </Show>

            {move || match (status.get(), error.get()) {
                (AnalysisState::Error, Some(message)) => view! { <ErrorBanner message=message /> }.into_any(),
                _ => ().into_any(),
            }}

            {move || match (status.get(), result.get()) {
                (AnalysisState::Success, Some(result)) => view! { <ResultCard result=result /> }.into_any(),
                _ => ().into_any(),
            }}
        </div>
    }
}
