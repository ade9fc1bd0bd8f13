use anyhow::{anyhow, Context, Result};
use colored::*;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::io::{self, Write};

/// Respuesta `ApiResponse` del backend
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    message: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct Session {
    id: String,
}

struct Console {
    client: Client,
    base_url: String,
    session_id: String,
    day: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    println!("{}", "🔋 Charge Expedition - Consola de campo".bright_blue().bold());
    println!("{}", "=======================================".bright_blue());
    println!();

    let base_url = std::env::var("EXPEDITION_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let client = Client::new();

    // Paso 1: abrir sesión de operador
    let session = start_session(&client, &base_url).await?;
    println!("{} {}", "🟢 Sesión:".bright_green(), session.id);

    let mut console = Console {
        client,
        base_url,
        session_id: session.id,
        day: "全部".to_string(),
    };

    // Paso 2: menú principal
    loop {
        println!();
        println!("{}", "📋 MENÚ PRINCIPAL".bright_green().bold());
        println!("{}", "==================".bright_green());
        println!("Filtro de día actual: {}", console.day.bright_cyan());
        println!("1. 📅 Cambiar filtro de día");
        println!("2. 🧭 Ver tramos de navegación");
        println!("3. 📱 Elegir tramo para el QR");
        println!("4. ⏱️  Capturar hora de inicio");
        println!("5. ⏱️  Capturar hora de fin");
        println!("6. 📝 Enviar registro de prueba");
        println!("7. 📂 Ver registros guardados");
        println!("8. 💾 Descargar CSV de registros");
        println!("9. 🚪 Salir");

        let choice = prompt("Selecciona una opción (1-9): ")?;
        let result = match choice.as_str() {
            "1" => {
                console.day = prompt("Día (número o 全部): ")?;
                Ok(())
            }
            "2" => console.list_segments().await,
            "3" => console.select_segment().await,
            "4" => console.capture("start-time").await,
            "5" => console.capture("end-time").await,
            "6" => console.submit_record().await,
            "7" => console.list_records().await,
            "8" => console.download().await,
            "9" => {
                console.end_session().await?;
                println!("{}", "👋 ¡Hasta luego!".bright_green());
                break;
            }
            _ => {
                println!("{}", "❌ Opción inválida. Intenta de nuevo.".bright_red());
                Ok(())
            }
        };

        if let Err(e) = result {
            println!("{} {:#}", "❌ Error:".bright_red().bold(), e);
        }
    }

    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label.bright_yellow());
    io::stdout().flush()?;
    let mut value = String::new();
    io::stdin().read_line(&mut value)?;
    Ok(value.trim().to_string())
}

/// Pedir una opción cerrada mostrando la lista numerada
fn choose(label: &str, options: &Value) -> Result<String> {
    let options: Vec<String> = options
        .as_array()
        .map(|values| values.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default();

    println!("{}", label.bright_blue());
    for (i, option) in options.iter().enumerate() {
        println!("  {}. {}", i + 1, option);
    }
    let raw = prompt("> ")?;
    let index: usize = raw.parse().context("se esperaba un número")?;
    options
        .get(index.wrapping_sub(1))
        .cloned()
        .ok_or_else(|| anyhow!("opción {} fuera de rango", raw))
}

/// Texto libre sólo cuando se eligió "其他"/"Other"
fn other_text(choice: &str, label: &str) -> Result<String> {
    if choice == "其他" || choice == "Other" {
        prompt(label)
    } else {
        Ok(String::new())
    }
}

async fn start_session(client: &Client, base_url: &str) -> Result<Session> {
    let response = client
        .post(format!("{}/api/sessions", base_url))
        .send()
        .await
        .context("no se pudo contactar el backend")?;

    let body: ApiResponse<Session> = response.json().await?;
    if !body.success {
        return Err(anyhow!("el backend rechazó la sesión: {:?}", body.message));
    }
    body.data.ok_or_else(|| anyhow!("respuesta sin sesión"))
}

/// Mostrar el error JSON del backend tal cual
async fn check(response: reqwest::Response) -> Result<Value> {
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);
    if status.is_success() {
        Ok(body)
    } else {
        Err(anyhow!(
            "{} {}: {}",
            status,
            body["code"].as_str().unwrap_or("ERROR"),
            body["message"].as_str().unwrap_or("sin mensaje")
        ))
    }
}

impl Console {
    fn session_url(&self, path: &str) -> String {
        format!(
            "{}/api/mission-report/sessions/{}/{}",
            self.base_url, self.session_id, path
        )
    }

    async fn list_segments(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/api/mission-report/segments", self.base_url))
            .query(&[("day", &self.day)])
            .send()
            .await?;
        let segments = check(response).await?;

        println!("{}", "🧭 TRAMOS DE NAVEGACIÓN".bright_cyan().bold());
        for segment in segments.as_array().into_iter().flatten() {
            println!(
                "  [{}] Día {}: {}",
                segment["index"],
                segment["day"],
                segment["caption"].as_str().unwrap_or_default()
            );
        }
        Ok(())
    }

    async fn select_segment(&self) -> Result<()> {
        let index: usize = prompt("Índice del tramo: ")?.parse().context("se esperaba un número")?;
        let response = self
            .client
            .post(self.session_url("navigation"))
            .query(&[("day", &self.day)])
            .json(&json!({ "index": index }))
            .send()
            .await?;
        let selected = check(response).await?;

        println!("{} {}", "📱 QR listo:".bright_green(), selected["caption"].as_str().unwrap_or_default());
        println!("{}", selected["navigation_url"].as_str().unwrap_or_default());
        Ok(())
    }

    async fn capture(&self, which: &str) -> Result<()> {
        let response = self.client.post(self.session_url(which)).send().await?;
        let captured = check(response).await?;
        println!(
            "{} {} = {}",
            "⏱️".bright_green(),
            captured["field"].as_str().unwrap_or(which),
            captured["value"].as_str().unwrap_or_default()
        );
        Ok(())
    }

    async fn submit_record(&self) -> Result<()> {
        let response = self
            .client
            .get(self.session_url("form"))
            .query(&[("day", &self.day)])
            .send()
            .await?;
        let form = check(response).await?;

        if form["available"] != json!(true) {
            println!("{}", form["message"].as_str().unwrap_or_default().bright_yellow());
            return Ok(());
        }
        let schema = &form["schema"];

        let station = choose("站點", &schema["stations"])?;
        let use_case = choose("Use Case", &schema["use_cases"])?;
        let status = choose("狀態", &schema["statuses"])?;
        let cpo_name = prompt("CPO Name: ")?;
        let manufacturer = prompt("製造商: ")?;
        let model = prompt("MODEL: ")?;
        let voltage = prompt("電壓(V): ")?;
        let current = prompt("電流(A): ")?;
        let power = prompt("功率(kW): ")?;
        let start_method = choose("開啟電裝方式", &schema["start_methods"])?;
        let start_method_other = other_text(&start_method, "其他方式說明: ")?;
        let start_soc = prompt("開始電量(%): ")?;
        let end_soc = prompt("結束電量(%): ")?;
        let end_method = choose("結束方法", &schema["end_methods"])?;
        let end_method_other = other_text(&end_method, "其他方法說明: ")?;
        let end_reason = choose("充電結束原因", &schema["end_reasons"])?;
        let end_reason_other = other_text(&end_reason, "其他原因說明: ")?;
        let test_result = choose("測試結果", &schema["test_results"])?;
        let error_category = choose("Error Describe", &schema["error_categories"])?;
        let error_category_other = other_text(&error_category, "其他錯誤說明: ")?;
        let remark = prompt("備註: ")?;

        let payload = json!({
            "station": station,
            "use_case": use_case,
            "status": status,
            "cpo_name": cpo_name,
            "manufacturer": manufacturer,
            "model": model,
            "voltage": voltage,
            "current": current,
            "power": power,
            "start_method": start_method,
            "start_method_other": start_method_other,
            "start_soc": start_soc,
            "end_soc": end_soc,
            "end_method": end_method,
            "end_method_other": end_method_other,
            "end_reason": end_reason,
            "end_reason_other": end_reason_other,
            "test_result": test_result,
            "error_category": error_category,
            "error_category_other": error_category_other,
            "remark": remark,
        });

        let response = self.client.post(self.session_url("records")).json(&payload).send().await?;
        let receipt = check(response).await?;

        println!("{}", receipt["message"].as_str().unwrap_or("✅ Registro guardado").bright_green().bold());
        println!("{}", serde_json::to_string_pretty(&receipt["data"]["summary"])?);
        println!("Total de registros: {}", receipt["data"]["total_records"]);
        Ok(())
    }

    async fn list_records(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/api/mission-report/records", self.base_url))
            .send()
            .await?;
        let records = check(response).await?;

        let rows = records.as_array().cloned().unwrap_or_default();
        println!("{}", format!("📂 {} registros guardados", rows.len()).bright_green().bold());
        for record in rows {
            println!(
                "  {} | {} | {} | {}",
                record["日期"].as_str().unwrap_or_default(),
                record["站點"].as_str().unwrap_or_default(),
                record["Use Case"].as_str().unwrap_or_default(),
                record["測試結果"].as_str().unwrap_or_default()
            );
        }
        Ok(())
    }

    async fn download(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/api/mission-report/records/download", self.base_url))
            .send()
            .await?;
        if !response.status().is_success() {
            check(response).await?;
            return Ok(());
        }

        let bytes = response.bytes().await?;
        let target = prompt("Guardar como (mission_test_records.csv): ")?;
        let target = if target.is_empty() {
            "mission_test_records.csv".to_string()
        } else {
            target
        };
        tokio::fs::write(&target, &bytes).await?;
        println!("{} {} ({} bytes)", "💾 Guardado en".bright_green(), target, bytes.len());
        Ok(())
    }

    async fn end_session(&self) -> Result<()> {
        let response = self
            .client
            .delete(format!("{}/api/sessions/{}", self.base_url, self.session_id))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}
