//! Embeds for the daily shop.

use super::logic::{CatalogItem, Reward, ShopCategory, discount_percent, find_item};
use crate::database::models::{ShopPurchase, ShopSlot};
use crate::ui::style::{COLOR_ALERT, COLOR_INFO, COLOR_SUCCESS, COLOR_WARNING, footer};
use crate::util::rp;
use chrono::{DateTime, Utc};
use serenity::builder::CreateEmbed;

fn price_text(slot: &ShopSlot) -> String {
    if slot.is_special {
        format!("~~{}~~ **{}** 🔥", rp(slot.original_price), rp(slot.price))
    } else {
        rp(slot.price)
    }
}

pub fn closed_embed(next_reset: DateTime<Utc>) -> CreateEmbed {
    CreateEmbed::new()
        .title("🛒 Daily Shop")
        .description("❌ Today's shop is sold out or not open yet!")
        .color(COLOR_WARNING)
        .field("⏰ Shop Reset", format!("<t:{}:R>", next_reset.timestamp()), false)
}

/// Today's stock grouped by category, with the viewer's balance.
pub fn shop_embed(slots: &[ShopSlot], balance: i64, prefix: &str, next_reset: DateTime<Utc>) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title("🛒 Daily Shop - Today's Deals")
        .description("📦 Limited stock! Grab them before they're gone!")
        .color(COLOR_INFO);
    for category in ShopCategory::ALL {
        let lines: Vec<String> = slots
            .iter()
            .filter_map(|slot| find_item(&slot.item_key).map(|item| (slot, item)))
            .filter(|(_, item)| item.category == category)
            .enumerate()
            .map(|(i, (slot, item))| {
                let tag = if slot.is_special {
                    format!(" **DEAL (-{}%)**", discount_percent(slot))
                } else {
                    String::new()
                };
                format!(
                    "`{}.` {} **{}**{tag}\n     💵 {} | 📦 Stock: **{}**",
                    i + 1,
                    item.emoji,
                    item.name,
                    price_text(slot),
                    slot.stock
                )
            })
            .collect();
        if !lines.is_empty() {
            embed = embed.field(category.title(), lines.join("\n\n"), false);
        }
    }
    embed
        .field("💳 Your Balance", rp(balance), false)
        .field(
            "🛍️ How to Buy",
            format!("`{prefix}shopbuy <item name>`\nExample: `{prefix}shopbuy lucky charm`"),
            false,
        )
        .footer(footer(format!(
            "Resets {} • Limited stock!",
            next_reset.format("%d %b %H:%M UTC")
        )))
}

pub fn announcement_embed(shop_id: &str, slots: &[ShopSlot], prefix: &str) -> CreateEmbed {
    let mut preview: Vec<&ShopSlot> = slots.iter().collect();
    preview.sort_by_key(|s| (!s.is_special, s.price));
    let lines: Vec<String> = preview
        .iter()
        .take(6)
        .filter_map(|slot| {
            let item = find_item(&slot.item_key)?;
            Some(format!("{} {} - {}", item.emoji, item.name, price_text(slot)))
        })
        .collect();
    let mut embed = CreateEmbed::new()
        .title("🛒 DAILY SHOP OPENED!")
        .description(
            "**A new shop is open!**\n\n🎉 Special deals available!\n⏰ Resets tomorrow at **00:00 WIB**\n📦 Limited stock!",
        )
        .color(COLOR_WARNING);
    if !lines.is_empty() {
        embed = embed.field("📋 Preview (Top 6)", lines.join("\n"), false);
    }
    embed
        .field(
            "🛍️ Commands",
            format!(
                "`{prefix}shop` - See every item\n`{prefix}shopbuy <item>` - Buy an item\n`{prefix}shopinfo` - How the shop works"
            ),
            false,
        )
        .footer(footer(format!("Shop ID: {shop_id} • Resets tomorrow 00:00 WIB")))
}

pub fn confirm_embed(slot: &ShopSlot, item: &CatalogItem, balance: i64) -> CreateEmbed {
    let deal = if slot.is_special {
        format!("\n🔥 **SPECIAL DEAL: -{}%**", discount_percent(slot))
    } else {
        String::new()
    };
    CreateEmbed::new()
        .title("🛍️ Confirm Purchase")
        .description(format!("Are you sure you want to buy this item?{deal}"))
        .color(COLOR_INFO)
        .field(format!("{} {}", item.emoji, item.name), item.description, false)
        .field("💵 Price", rp(slot.price), true)
        .field("💳 Balance", rp(balance), true)
        .field("📦 Stock", slot.stock.to_string(), true)
        .footer(footer("React ✅ to confirm or ❌ to cancel (30 seconds)"))
}

pub fn canceled_embed(title: &str) -> CreateEmbed {
    CreateEmbed::new().title(title).color(COLOR_ALERT)
}

pub fn bought_embed(item: &CatalogItem, price: i64, stock_left: i64, reward: &Reward) -> CreateEmbed {
    CreateEmbed::new()
        .title("✅ Purchase Complete!")
        .description(format!("You bought **{}**!", item.name))
        .color(COLOR_SUCCESS)
        .field("📦 Item", format!("{} {}", item.emoji, item.name), true)
        .field("💵 Price", rp(price), true)
        .field("📦 Stock Left", stock_left.to_string(), true)
        .field("🎁 Reward", reward.describe(), false)
        .footer(footer("Thanks for shopping!"))
}

pub fn system_info_embed(prefix: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title("🛒 Daily Shop System - Info")
        .description("A shop with limited items and special deals!")
        .color(COLOR_WARNING)
        .field(
            "🎯 How It Works",
            "1️⃣ Resets **every day at 00:00 WIB**\n2️⃣ **8-12 random items** from the catalog\n3️⃣ **Limited stock** per item\n4️⃣ **1-2 special deals** at 20-50% off\n5️⃣ **First come, first served**!",
            false,
        )
        .field(
            "🛍️ Commands",
            format!(
                "`{prefix}shop` - See every item\n`{prefix}shopbuy <item>` - Buy an item\n`{prefix}shopinfo [item]` - This info, or one item\n`{prefix}shophistory [n]` - Your purchases"
            ),
            false,
        )
        .field(
            "💡 Tips",
            "⏰ Check the shop **in the morning**\n🔥 Prioritise **special deals**\n🍀 **Luck boosters** are permanent\n🎁 **Mystery box** = high risk high reward",
            false,
        )
}

pub fn item_embed(item: &CatalogItem, today: Option<&ShopSlot>) -> CreateEmbed {
    let availability = match today {
        Some(slot) => format!("✅ In today's shop: {} (stock {})", price_text(slot), slot.stock),
        None => "❌ Not in today's shop".to_string(),
    };
    CreateEmbed::new()
        .title(format!("{} {}", item.emoji, item.name))
        .description(item.description)
        .color(COLOR_INFO)
        .field("💵 Base Price", rp(item.base_price), true)
        .field("📦 Max Stock", item.max_stock.to_string(), true)
        .field("🏷️ Category", item.category.title(), true)
        .field("🛒 Today", availability, false)
        .footer(footer(format!("Key: {}", item.key)))
}

pub fn history_embed(name: &str, purchases: &[ShopPurchase]) -> CreateEmbed {
    let total: i64 = purchases.iter().map(|p| p.price).sum();
    let lines: Vec<String> = purchases
        .iter()
        .map(|p| {
            let label = find_item(&p.item_key)
                .map(|i| format!("{} {}", i.emoji, i.name))
                .unwrap_or_else(|| p.item_key.clone());
            format!("{label} • {} • <t:{}:d>", rp(p.price), p.purchased_at.timestamp())
        })
        .collect();
    // Embed descriptions cap at 4096 characters.
    let mut body = String::new();
    for line in lines {
        if body.len() + line.len() + 1 > 4000 {
            body.push_str("\n…");
            break;
        }
        body.push_str(&line);
        body.push('\n');
    }
    CreateEmbed::new()
        .title(format!("📜 Shop History • {name}"))
        .description(body)
        .color(COLOR_INFO)
        .footer(footer(format!(
            "{} purchases • {} spent",
            purchases.len(),
            rp(total)
        )))
}
