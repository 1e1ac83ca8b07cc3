use crate::types::{EvidenceBlob, ItineraryPrompt, TripRequest};

/// Renders the itinerary instructions for `trip`, grounded in `evidence`.
pub fn build_prompt(trip: &TripRequest, evidence: &EvidenceBlob) -> ItineraryPrompt {
    let TripRequest {
        destination,
        start_location,
        duration,
        trip_type,
        budget,
    } = trip;
    let label = evidence.source().label();
    let label_lower = label.to_lowercase();
    let evidence_text = evidence.text();

    let text = format!(
        "You are an expert travel agent. Your task is to create a detailed and practical travel itinerary by analyzing the **{label_lower}** of multiple YouTube videos. You must adhere strictly to all the user's constraints.

**User's Trip Details:**
- **Trip Origin:** {start_location}
- **Destination:** {destination}
- **Duration:** {duration} days
- **Trip Style:** {trip_type}
- **Total Budget (approximate):** {budget}

**Your Task:**
1. Analyze the following collection of YouTube video {label_lower} for '{destination}'.
2. Identify the most frequently mentioned landmarks, activities, restaurants, and tips.
3. Create a logical, day-by-day itinerary covering exactly {duration} days.
4. The itinerary must match the **{trip_type}** style. Prioritize suggestions that fit this style.
5. Provide an estimated daily cost breakdown and ensure the total trip cost stays within the approximate budget of **{budget}**.
6. If the trip is international (e.g., from {start_location} to {destination}), include a note about estimated travel time and potential flight costs, but focus the detailed itinerary on the destination itself.
7. Format the output using Markdown.

**Video Data ({label}):**
---
{evidence_text}
"
    );

    ItineraryPrompt::new(text)
}
