//! Server-side HTML for the public pages.

use crate::core::catalog::{format_percent, tel_href, BranchOrder, PageMetadata, StoreCard, SITE_NAME};
use crate::core::geo::format_distance;
use crate::core::hours::HoursView;
use crate::core::location::{self, status_message};
use crate::core::search::{HomeView, SearchParams};
use crate::domain::model::{DetailBranch, Promotion, SortOption, StoreDetail, StoreSummary};
use chrono::Weekday;
use std::fmt::Write;

pub const SITE_TAGLINE: &str = "Mapa colaborativo para encontrar descuentos en Montevideo";
pub const SITE_DESCRIPTION: &str = "Descubre y compara las mejores promociones activas en Montevideo con información actualizada de locales, sucursales y horarios.";

const STYLE: &str = r#"
body { margin: 0; font-family: system-ui, sans-serif; background: #f9fafb; color: #1f2937; }
a { color: #7e22ce; }
header.site { position: sticky; top: 0; background: #fff; border-bottom: 1px solid #f3f4f6; }
header.site .bar, main { max-width: 80rem; margin: 0 auto; padding: 1rem; }
header.site .bar { display: flex; justify-content: space-between; align-items: center; }
.grid { display: grid; gap: 1.5rem; grid-template-columns: repeat(auto-fill, minmax(18rem, 1fr)); }
.card { display: flex; flex-direction: column; background: #fff; border-radius: .75rem; box-shadow: 0 1px 3px rgba(0,0,0,.1); text-decoration: none; color: inherit; overflow: hidden; }
.card .logo { height: 8rem; display: flex; align-items: center; justify-content: center; background: #e5e7eb; }
.card .logo img { max-height: 7rem; max-width: 90%; object-fit: contain; }
.card .body { padding: 1rem; flex: 1; }
.promo { padding: .75rem; border: 1px solid #e5e7eb; border-radius: .5rem; background: #f9fafb; margin: .5rem 0; }
.promo .value { font-weight: 700; color: #9333ea; }
.badge { padding: .1rem .5rem; border-radius: 9999px; font-size: .75rem; font-weight: 600; }
.badge.open { background: #dcfce7; color: #166534; }
.badge.closed { background: #fee2e2; color: #991b1b; }
.error { background: #fef2f2; color: #dc2626; padding: .75rem 1rem; border-radius: .5rem; text-align: center; }
.empty { text-align: center; color: #6b7280; }
#location-status { position: fixed; bottom: 1rem; left: 1rem; background: #fff; padding: .75rem 1rem; border-radius: .75rem; box-shadow: 0 4px 12px rgba(0,0,0,.15); font-size: .875rem; }
#map { height: 75vh; }
li.today { font-weight: 700; }
"#;

const LOCATION_SCRIPT: &str = r#"
(function () {
  var KEY = 'descuentosuy:geo';
  var DENIED_KEY = 'descuentosuy:geo-denied';
  var overlay = document.getElementById('location-status');

  function loadMeta() {
    try { return JSON.parse(sessionStorage.getItem(KEY) || 'null'); } catch (e) { return null; }
  }
  function saveMeta(meta) { sessionStorage.setItem(KEY, JSON.stringify(meta)); }
  function hasCoordinates() {
    var params = new URLSearchParams(window.location.search);
    return params.has('lat') && params.has('lon');
  }

  function renderStatus() {
    if (!overlay) { return; }
    var meta = loadMeta();
    var denied = sessionStorage.getItem(DENIED_KEY) === 'true';
    var query = new URLSearchParams();
    query.set('has_coordinates', hasCoordinates() ? 'true' : 'false');
    if (denied) { query.set('source', 'denied'); } else if (meta && meta.source) { query.set('source', meta.source); }
    if (meta && meta.accuracy != null) { query.set('accuracy', meta.accuracy); }
    if (meta && meta.updatedAt) { query.set('elapsed_ms', Date.now() - meta.updatedAt); }
    fetch('/api/location/status?' + query.toString())
      .then(function (response) { return response.json(); })
      .then(function (status) {
        overlay.querySelector('[data-status]').textContent =
          status.updated_label ? status.status + ' · ' + status.updated_label : status.status;
        overlay.querySelector('[data-accuracy]').textContent = status.accuracy_label;
        overlay.querySelector('[data-retry]').hidden = !denied;
      })
      .catch(function () {});
  }

  function report(position, watchId) {
    var meta = loadMeta();
    var body = {
      last: hasCoordinates() && meta && meta.source === 'gps' ? { lat: meta.lat, lon: meta.lon, accuracy: meta.accuracy } : null,
      update: { lat: position.coords.latitude, lon: position.coords.longitude, accuracy: position.coords.accuracy },
      path: window.location.pathname + window.location.search
    };
    fetch('/api/location/refine', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify(body)
    })
      .then(function (response) { return response.json(); })
      .then(function (decision) {
        if (!decision.apply) { return; }
        if (decision.stop_watching && watchId != null) { navigator.geolocation.clearWatch(watchId); }
        saveMeta({
          lat: body.update.lat, lon: body.update.lon, accuracy: body.update.accuracy,
          updatedAt: Date.now(), source: 'gps', watching: !decision.stop_watching
        });
        if (decision.replace) { window.location.replace(decision.next); } else { window.location.assign(decision.next); }
      })
      .catch(function (error) { console.warn('[location] refine failed', error); });
  }

  function onError(error) {
    if (error && error.code === 1) {
      sessionStorage.setItem(DENIED_KEY, 'true');
      renderStatus();
      return;
    }
    console.warn('[location] geolocation error', error && error.message);
  }

  var retry = overlay && overlay.querySelector('[data-retry]');
  if (retry) {
    retry.addEventListener('click', function () {
      sessionStorage.removeItem(KEY);
      sessionStorage.removeItem(DENIED_KEY);
    });
  }

  // 伺服器確認手動位置後才會帶著 #manual 重導回來
  if (window.location.hash.indexOf('#manual') === 0 && hasCoordinates()) {
    var current = new URLSearchParams(window.location.search);
    var precision = parseFloat(window.location.hash.split('=')[1]);
    saveMeta({
      lat: parseFloat(current.get('lat')), lon: parseFloat(current.get('lon')),
      accuracy: isNaN(precision) ? null : precision,
      updatedAt: Date.now(), source: 'manual', watching: false
    });
    sessionStorage.removeItem(DENIED_KEY);
    history.replaceState(null, '', window.location.pathname + window.location.search);
  }

  renderStatus();
  if (!('geolocation' in navigator) || sessionStorage.getItem(DENIED_KEY) === 'true') { return; }

  var meta = loadMeta();
  if (meta && meta.source === 'gps' && meta.watching) {
    var watchId = navigator.geolocation.watchPosition(
      function (position) { report(position, watchId); },
      function (error) { onError(error); navigator.geolocation.clearWatch(watchId); },
      { enableHighAccuracy: true, maximumAge: 0, timeout: 20000 }
    );
    return;
  }
  if (hasCoordinates()) { return; }
  navigator.geolocation.getCurrentPosition(
    function (position) { report(position, null); },
    onError,
    { enableHighAccuracy: true, maximumAge: 5000, timeout: 20000 }
  );
})();
"#;

const MAP_SCRIPT: &str = r#"
(function () {
  var data = JSON.parse(document.getElementById('map-data').textContent);
  var map = L.map('map').setView([data.center.lat, data.center.lon], data.zoom);
  L.tileLayer(data.tile_url, { attribution: data.attribution }).addTo(map);
  if (data.user) {
    L.marker([data.user.lat, data.user.lon]).addTo(map).bindPopup(data.user.label);
  }
  data.markers.forEach(function (marker) {
    var popup = document.createElement('div');
    var title = document.createElement('b');
    title.textContent = marker.label;
    popup.appendChild(title);
    if (marker.store_name) {
      popup.appendChild(document.createElement('br'));
      popup.appendChild(document.createTextNode(marker.store_name));
    }
    if (marker.href) {
      var link = document.createElement('a');
      link.href = marker.href;
      link.textContent = 'Ver local';
      popup.appendChild(document.createElement('br'));
      popup.appendChild(link);
    }
    L.marker([marker.lat, marker.lon]).addTo(map).bindPopup(popup);
  });
})();
"#;

pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// 放進 <script> 的 JSON 不能出現 `</`
fn script_json(json: &str) -> String {
    json.replace("</", "<\\/")
}

pub struct Head<'a> {
    pub title: String,
    pub description: String,
    pub og_title: Option<&'a str>,
    pub og_image: Option<&'a str>,
    pub extra: &'a str,
}

impl<'a> Head<'a> {
    pub fn site(title: Option<&str>) -> Self {
        Self {
            title: match title {
                Some(t) => format!("{} | {}", t, SITE_NAME),
                None => format!("{} | Descuentos en Montevideo", SITE_NAME),
            },
            description: format!("{}. {}", SITE_TAGLINE, SITE_DESCRIPTION),
            og_title: None,
            og_image: None,
            extra: "",
        }
    }
}

pub fn layout(head: &Head, body: &str, with_location: bool) -> String {
    let mut meta = String::new();
    let _ = write!(
        meta,
        "<meta name=\"description\" content=\"{}\">",
        escape(&head.description)
    );
    if let Some(og_title) = head.og_title {
        let _ = write!(
            meta,
            "<meta property=\"og:title\" content=\"{}\"><meta property=\"og:description\" content=\"{}\"><meta property=\"og:type\" content=\"website\">",
            escape(og_title),
            escape(&head.description)
        );
    }
    if let Some(image) = head.og_image {
        let _ = write!(meta, "<meta property=\"og:image\" content=\"{}\">", escape(image));
    }

    let script = if with_location {
        format!("<script>{}</script>", LOCATION_SCRIPT)
    } else {
        String::new()
    };

    format!(
        "<!doctype html><html lang=\"es\"><head><meta charset=\"utf-8\">\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
<title>{}</title>{}<style>{}</style>{}</head><body>{}{}</body></html>",
        escape(&head.title),
        meta,
        STYLE,
        head.extra,
        body,
        script
    )
}

/// 位置狀態浮動列；文字由腳本依瀏覽器狀態更新
pub fn location_status(params: &SearchParams, current_path: &str) -> String {
    let has_coordinates = params.has_coordinates();
    let return_to = url::form_urlencoded::byte_serialize(current_path.as_bytes()).collect::<String>();
    let retry_href = format!("/ubicacion?clear=1&return_to={}", return_to);

    format!(
        "<div id=\"location-status\"><p data-status>{}</p><p data-accuracy>{}</p>\
<a href=\"/ubicacion?return_to={}\">Ajustar</a> \
<a href=\"{}\" data-retry hidden>Reintentar</a></div>",
        status_message(None, has_coordinates),
        location::format_accuracy(None),
        return_to,
        escape(&retry_href)
    )
}

fn logo(logo_url: Option<&str>, name: &str, fallback: &str) -> String {
    match logo_url {
        Some(url) => format!(
            "<img src=\"{}\" alt=\"{} logo\">",
            escape(url),
            escape(name)
        ),
        None => format!("<span>{}</span>", fallback),
    }
}

fn promotion_block(promotion: &Promotion) -> String {
    format!(
        "<div class=\"promo\"><p><span class=\"value\">{}</span> <span class=\"name\">{}</span></p>\
<p><strong>Emisor:</strong> <span>{}</span></p><p><strong>Tarjetas:</strong> {}</p></div>",
        format_percent(promotion.value),
        escape(&promotion.name),
        escape(&promotion.card_issuer),
        escape(promotion.card_tier.as_deref().unwrap_or_default())
    )
}

pub fn store_card(card: &StoreCard) -> String {
    let store = card.store;
    let mut html = format!(
        "<a class=\"card\" href=\"{}\"><div class=\"logo\">{}</div><div class=\"body\"><h3>{}</h3>",
        escape(&card.href),
        logo(store.logo_url.as_deref(), &store.name, "Logo no disponible"),
        escape(&store.name)
    );

    if let Some(km) = store.distance_km {
        let _ = write!(html, "<p class=\"distance\">{}</p>", format_distance(km));
    }

    match card.top_promotion {
        Some(top) => {
            html.push_str(&promotion_block(top));
            if let Some(label) = card.extra_label() {
                let _ = write!(html, "<p class=\"extra\">{}</p><ul>", label);
                for promotion in &card.extra_promotions {
                    let _ = write!(
                        html,
                        "<li><span class=\"value\">{}</span> <span>{}</span></li>",
                        format_percent(promotion.value),
                        escape(&promotion.name)
                    );
                }
                html.push_str("</ul>");
            }
        }
        None => html.push_str("<p class=\"empty\">No hay promociones asignadas a este local.</p>"),
    }

    html.push_str("<span class=\"cta\">Ver detalles completos</span></div></a>");
    html
}

fn card_grid(stores: &[StoreSummary], view: &HomeView) -> String {
    let cards: String = stores
        .iter()
        .map(|store| store_card(&StoreCard::new(store, view.user_location.as_ref())))
        .collect();
    format!("<div class=\"grid\">{}</div>", cards)
}

fn sort_select(selected: SortOption) -> String {
    let options: String = SortOption::all()
        .iter()
        .map(|option| {
            format!(
                "<option value=\"{}\"{}>{}</option>",
                option.as_str(),
                if *option == selected { " selected" } else { "" },
                option.label()
            )
        })
        .collect();
    format!("<select id=\"sort\" name=\"sort\">{}</select>", options)
}

fn site_header(map_href: &str) -> String {
    format!(
        "<header class=\"site\"><div class=\"bar\"><a href=\"/\"><strong>{}</strong></a>\
<nav><a href=\"#top-promos\">Destacados</a> <a href=\"{}\">Ver mapa &rarr;</a></nav></div></header>",
        SITE_NAME,
        escape(map_href)
    )
}

pub fn home_page(view: &HomeView, params: &SearchParams, current_path: &str) -> String {
    let mut body = site_header(&view.map_href);
    body.push_str("<main>");

    body.push_str(
        "<section class=\"hero\"><p>Montevideo, Uruguay</p>\
<h1>Encontrá los mejores descuentos cerca tuyo</h1>\
<p>Descubrí promociones de locales, bancos y tarjetas en tiempo real. Todo en un solo lugar.</p>\
<p><a href=\"#top-promos\">Ver descuentos</a> <a href=\"/mapa\">Abrir mapa</a></p></section>",
    );

    let _ = write!(
        body,
        "<section><form method=\"GET\" action=\"/\">\
<label for=\"query\">Buscar locales o promociones</label>\
<input id=\"query\" type=\"search\" name=\"query\" value=\"{}\" placeholder=\"Ej: hamburguesa, cafe, Santander...\">\
<label for=\"sort\">Ordenar resultados</label>{}{}{}\
<button type=\"submit\">Buscar</button></form></section>",
        escape(params.query().unwrap_or_default()),
        sort_select(params.sort_option()),
        hidden_input("lat", params.lat()),
        hidden_input("lon", params.lon()),
    );

    body.push_str(
        "<section id=\"top-promos\"><p>Promociones imperdibles</p>\
<h2>Los descuentos más fuertes de la semana</h2>\
<p>Calculamos el beneficio mayor por sucursal y destacamos las oportunidades con mejor porcentaje de ahorro.</p>",
    );
    if view.top_discounts.is_empty() {
        body.push_str(
            "<p class=\"empty\">Cargaremos descuentos destacados cuando existan promociones activas.</p>",
        );
    } else {
        body.push_str(&card_grid(&view.top_discounts, view));
    }
    body.push_str("</section>");

    if !view.nearby.is_empty() {
        body.push_str(
            "<section><p>A metros de tu ubicación</p><h2>Sucursales cercanas para pasar hoy</h2>\
<p>Según tu última ubicación detectada, estas son las sucursales más próximas con beneficios vigentes.</p>",
        );
        body.push_str(&card_grid(&view.nearby, view));
        body.push_str("</section>");
    }

    let _ = write!(
        body,
        "<section><h2>Mapa interactivo</h2><p>Visualizá todos los locales en el mapa</p>\
<a href=\"{}\">Ver mapa</a></section>",
        escape(&view.map_href)
    );

    body.push_str(
        "<section><h2>Todos los locales con beneficios</h2>\
<p>Explorá el listado completo y abrí la ficha para ver horarios, teléfonos y promociones adicionales.</p>",
    );
    if view.stores.is_empty() {
        let message = match params.query() {
            Some(query) => format!("No se encontraron resultados para \"{}\".", escape(query)),
            None => "No hay locales para mostrar.".to_string(),
        };
        let _ = write!(body, "<p class=\"empty\">{}</p>", message);
    } else {
        body.push_str(&card_grid(&view.stores, view));
    }
    body.push_str("</section></main>");
    body.push_str(&location_status(params, current_path));

    layout(&Head::site(None), &body, true)
}

fn hidden_input(name: &str, value: Option<&str>) -> String {
    match value {
        Some(value) => format!(
            "<input type=\"hidden\" name=\"{}\" value=\"{}\">",
            name,
            escape(value)
        ),
        None => String::new(),
    }
}

pub fn home_error(message: &str) -> String {
    let body = format!(
        "<p class=\"error\">Error al cargar los datos: {}</p>",
        escape(message)
    );
    layout(&Head::site(None), &body, false)
}

fn map_header(list_href: Option<&str>) -> String {
    let mut html = String::from(
        "<header class=\"site\"><div class=\"bar\"><div><a href=\"/?\">&larr; Volver al inicio</a>\
<h1>Mapa de descuentos</h1>",
    );
    if let Some(href) = list_href {
        let _ = write!(
            html,
            "<p>Explora sucursales cercanas y afina tu ubicación en tiempo real.</p></div>\
<a href=\"{}\">Ver lista de locales</a>",
            escape(href)
        );
    } else {
        html.push_str("</div>");
    }
    html.push_str("</div></header>");
    html
}

pub fn map_page(map_json: &str, params: &SearchParams, current_path: &str) -> String {
    let head = Head {
        extra: "<link rel=\"stylesheet\" href=\"https://unpkg.com/leaflet@1.9.4/dist/leaflet.css\">\
<script src=\"https://unpkg.com/leaflet@1.9.4/dist/leaflet.js\"></script>",
        ..Head::site(Some("Mapa de descuentos"))
    };

    let body = format!(
        "{}<main><div id=\"map\"></div></main>\
<script id=\"map-data\" type=\"application/json\">{}</script><script>{}</script>{}",
        map_header(Some(&params.list_href())),
        script_json(map_json),
        MAP_SCRIPT,
        location_status(params, current_path)
    );

    layout(&head, &body, true)
}

pub fn map_error(message: &str) -> String {
    let body = format!(
        "{}<main><p class=\"error\">No pudimos cargar el mapa: {}</p></main>",
        map_header(None),
        escape(message)
    );
    layout(&Head::site(Some("Mapa de descuentos")), &body, false)
}

pub fn opening_hours(view: &HoursView) -> String {
    let mut html = format!(
        "<details class=\"hours\"><summary><span class=\"badge {}\">{}</span> <span>{}</span></summary><ul>",
        if view.is_open { "open" } else { "closed" },
        view.status_label,
        escape(&view.today)
    );
    for (index, line) in view.week.iter().enumerate() {
        let class = if index == view.today_index { " class=\"today\"" } else { "" };
        let _ = write!(html, "<li{}>{}</li>", class, escape(line));
    }
    html.push_str("</ul></details>");
    html
}

fn branch_block(branch: &DetailBranch, weekday: Weekday) -> String {
    let mut html = format!("<div class=\"promo branch\"><p><strong>{}</strong>", escape(&branch.name));
    if let Some(km) = branch.distance_km {
        let _ = write!(html, " <span>{}</span>", format_distance(km));
    }
    html.push_str("</p>");
    if let Some(address) = &branch.address {
        let _ = write!(html, "<p>{}</p>", escape(address));
    }

    if let Some(details) = &branch.branch_details {
        if let Some(phone) = &details.phone_number {
            let _ = write!(
                html,
                "<a href=\"{}\"><strong>Tel:</strong> {}</a>",
                escape(&tel_href(phone)),
                escape(phone)
            );
        }
        if let Some(rating) = details.rating {
            let _ = write!(
                html,
                "<p>★ <strong>{}</strong> ({} reseñas)</p>",
                rating,
                details.user_ratings_total.unwrap_or(0)
            );
        }
        if let Some(hours) = HoursView::build(details.opening_hours.as_ref(), weekday) {
            html.push_str(&opening_hours(&hours));
        }
    }

    html.push_str("</div>");
    html
}

pub fn store_page(
    store: &StoreDetail,
    branches: &[DetailBranch],
    metadata: &PageMetadata,
    order: BranchOrder,
    params: &SearchParams,
    weekday: Weekday,
    current_path: &str,
) -> String {
    let head = Head {
        title: metadata.title.clone(),
        description: metadata.description.clone(),
        og_title: metadata.og_title.as_deref(),
        og_image: metadata.og_image.as_deref(),
        extra: "",
    };

    let mut body = format!(
        "<header class=\"site\"><div class=\"bar\"><a href=\"{}\">&larr; Volver a la lista</a></div></header><main>\
<div class=\"store-head\"><div class=\"logo\">{}</div><h1>{}</h1>",
        escape(&params.list_href()),
        logo(store.logo_url.as_deref(), &store.name, "Sin logo"),
        escape(&store.name)
    );
    if let Some(website) = &store.website {
        let _ = write!(
            body,
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">Visitar sitio web ↗</a>",
            escape(website)
        );
    }
    body.push_str("</div>");

    body.push_str("<section><h2>Promociones Disponibles</h2>");
    if store.promotions.is_empty() {
        body.push_str("<p class=\"empty\">No hay promociones específicas para este local.</p>");
    } else {
        for promotion in &store.promotions {
            body.push_str(&promotion_block(promotion));
        }
    }
    body.push_str("</section>");

    let _ = write!(
        body,
        "<section><h2>Sucursales</h2><form method=\"GET\">{}{}\
<select name=\"order\" onchange=\"this.form.submit()\">\
<option value=\"distance\"{}>Ordenar por Cercanía</option>\
<option value=\"rating\"{}>Ordenar por Rating</option></select></form>",
        hidden_input("lat", params.lat()),
        hidden_input("lon", params.lon()),
        if order == BranchOrder::Distance { " selected" } else { "" },
        if order == BranchOrder::Rating { " selected" } else { "" },
    );
    if branches.is_empty() {
        body.push_str("<p class=\"empty\">No se encontraron sucursales para este local.</p>");
    } else {
        for branch in branches {
            body.push_str(&branch_block(branch, weekday));
        }
    }
    body.push_str("</section></main>");
    body.push_str(&location_status(params, current_path));

    layout(&head, &body, true)
}

pub fn not_found_page() -> String {
    let body = "<main><h1>Local no encontrado</h1><p><a href=\"/\">Volver al inicio</a></p></main>";
    layout(&Head::site(Some("Local no encontrado")), body, false)
}

/// 手動設定位置的頁面
pub fn location_page(form: &location::ManualLocationForm, error: Option<&str>) -> String {
    let return_to = location::safe_return_path(form.return_to.as_deref());
    let mut body = String::from(
        "<main><h1>Ajustar ubicación</h1>\
<p>Escribe una direccion completa (ej: Charrua 2515, Montevideo) o ingresa coordenadas exactas.</p>",
    );
    if let Some(error) = error {
        let _ = write!(body, "<p class=\"error\">{}</p>", escape(error));
    }

    let _ = write!(
        body,
        "<form method=\"GET\" action=\"/ubicacion\">\
<input type=\"hidden\" name=\"return_to\" value=\"{}\">\
<label>Direccion <input type=\"text\" name=\"address\" value=\"{}\" placeholder=\"Ej: Charrua 2515, Montevideo\"></label>\
<details><summary>Ingresar coordenadas manualmente</summary>\
<label>Latitud <input type=\"text\" inputmode=\"decimal\" name=\"lat\" value=\"{}\" placeholder=\"-34.90\"></label>\
<label>Longitud <input type=\"text\" inputmode=\"decimal\" name=\"lon\" value=\"{}\" placeholder=\"-56.16\"></label></details>\
<a href=\"{}\">Cancelar</a> <button type=\"submit\">Guardar ubicacion</button></form>\
<form method=\"GET\" action=\"/ubicacion\" onsubmit=\"sessionStorage.removeItem('descuentosuy:geo')\">\
<input type=\"hidden\" name=\"return_to\" value=\"{}\"><input type=\"hidden\" name=\"clear\" value=\"1\">\
<button type=\"submit\">Limpiar valores guardados</button></form></main>",
        escape(&return_to),
        escape(form.address.as_deref().unwrap_or_default()),
        escape(&location::clamp_coordinate_input(form.lat.as_deref().unwrap_or_default())),
        escape(&location::clamp_coordinate_input(form.lon.as_deref().unwrap_or_default())),
        escape(&return_to),
        escape(&return_to),
    );

    layout(&Head::site(Some("Ajustar ubicación")), &body, false)
}
